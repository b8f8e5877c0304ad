//! Module with the top-level [`GeneratorBuilder`]: the entry point that turns per-mode named
//! patterns and a mode-transition table into a combined, minimized, multi-mode DFA.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::internal::dfa::{construct_fat_dfa, Dfa};
use crate::internal::ids::{NodeID, NodeIDBase};
use crate::internal::minimizer::minimize;
use crate::internal::nfa::Nfa;
use crate::mode::{build_modes, Mode, ModeTransitions};
use crate::pattern::Pattern;

/// The combined, multi-mode DFA and its auxiliary tables: the artifact a lexer runtime is built
/// from, and the artifact an out-of-process emitter would serialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedDfa {
    #[serde(with = "transitions_serde")]
    pub(crate) transitions: BTreeMap<NodeID, [Option<NodeID>; 256]>,
    pub(crate) match_names: BTreeMap<NodeID, String>,
    /// Pattern names whose source pattern is a literal byte string, unioned across all modes.
    pub literal_rules: std::collections::BTreeSet<String>,
    num_nodes: NodeIDBase,
}

impl CombinedDfa {
    /// `transitions[node][byte]` if present.
    pub fn advance(&self, node: NodeID, byte: u8) -> Option<NodeID> {
        self.transitions.get(&node).and_then(|row| row[byte as usize])
    }

    /// The match name recorded at `node`, if any.
    pub fn match_name(&self, node: NodeID) -> Option<&str> {
        self.match_names.get(&node).map(String::as_str)
    }

    /// Total node count in the combined automaton.
    pub fn num_nodes(&self) -> NodeIDBase {
        self.num_nodes
    }
}

mod transitions_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        map: &BTreeMap<NodeID, [Option<NodeID>; 256]>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let as_vecs: BTreeMap<NodeID, Vec<Option<NodeID>>> =
            map.iter().map(|(k, v)| (*k, v.to_vec())).collect();
        as_vecs.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<BTreeMap<NodeID, [Option<NodeID>; 256]>, D::Error> {
        let as_vecs: BTreeMap<NodeID, Vec<Option<NodeID>>> = BTreeMap::deserialize(deserializer)?;
        let mut out = BTreeMap::new();
        for (k, v) in as_vecs {
            let mut row = [None; 256];
            for (i, slot) in v.into_iter().enumerate().take(256) {
                row[i] = slot;
            }
            out.insert(k, row);
        }
        Ok(out)
    }
}

/// Final output of the generator pipeline: the artifacts a lexer runtime and an out-of-process
/// emitter both need.
#[derive(Debug, Clone)]
pub struct GeneratorOutput {
    /// The combined multi-mode DFA.
    pub dfa: CombinedDfa,
    /// Per-mode metadata, sorted so that `main` is first, then lexically by name.
    pub modes: Vec<Mode>,
    /// Maps every node in the combined DFA to the mode that owns it. Used only for diagnostic
    /// labels; the authoritative current mode lives on the lexer's own stack.
    pub node_modes: BTreeMap<NodeID, String>,
    /// Unchanged pass-through of the mode-transition table supplied to the builder.
    pub mode_transitions: ModeTransitions,
}

/// Builder that accumulates modes and mode transitions, then runs the full pipeline (NFA, fat
/// DFA, minimization, combination) in one `build()` call. Mirrors the construction-time
/// ergonomics of a scanner builder: accumulate, then build once, surfacing the first fatal error.
#[derive(Debug, Default)]
pub struct GeneratorBuilder {
    modes: BTreeMap<String, Vec<(String, Pattern)>>,
    mode_transitions: ModeTransitions,
}

impl GeneratorBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mode's named patterns. Calling this twice for the same mode name replaces the
    /// prior registration.
    pub fn mode(mut self, name: impl Into<String>, patterns: Vec<(String, Pattern)>) -> Self {
        self.modes.insert(name.into(), patterns);
        self
    }

    /// Registers a mode transition: emitting `kind` while in `from_mode` pushes `(to_mode,
    /// pop_kind)` onto the lexer's mode stack.
    pub fn mode_transition(
        mut self,
        from_mode: impl Into<String>,
        kind: impl Into<String>,
        to_mode: impl Into<String>,
        pop_kind: impl Into<String>,
    ) -> Self {
        self.mode_transitions
            .insert((from_mode.into(), kind.into()), (to_mode.into(), pop_kind.into()));
        self
    }

    /// Runs the full pipeline: per-mode NFA construction and validation, fat DFA construction,
    /// minimization, and mode combination. Returns the first fatal [`Error`] encountered.
    pub fn build(self) -> Result<GeneratorOutput> {
        if self.modes.is_empty() {
            log::warn!("generator invoked with no modes registered");
        }

        let mut rule_owners: BTreeMap<String, String> = BTreeMap::new();
        let mut min_dfas: BTreeMap<String, Dfa> = BTreeMap::new();

        for (mode_name, patterns) in &self.modes {
            for (rule_name, _) in patterns {
                if let Some(owner) = rule_owners.get(rule_name) {
                    if owner != mode_name {
                        return Err(Error::RuleNameCollision(rule_name.clone()));
                    }
                } else {
                    rule_owners.insert(rule_name.clone(), mode_name.clone());
                }
            }

            let nfa = Nfa::from_patterns(mode_name, patterns);
            if let Some(name) = nfa.trivially_matched_rules().into_iter().next() {
                return Err(Error::TrivialMatch(name));
            }

            let fat = construct_fat_dfa(&nfa)?;
            let post_match = fat.post_match_nodes();
            if !post_match.is_empty() {
                log::warn!(
                    "mode '{}': {} post-match node(s) reachable after a match; patterns may be over-specified",
                    mode_name,
                    post_match.len()
                );
            }

            let min = minimize(&fat)?;
            min_dfas.insert(mode_name.clone(), min);
        }

        combine_modes(min_dfas, self.mode_transitions)
    }
}

/// Combines one minimized DFA per mode into a single combined DFA (C7): stable-sorts modes so
/// `main` is first, then lexically, renumbers each mode's nodes in the order of their original
/// ids, and unions transitions, match names, and literal rules through the remap.
fn combine_modes(
    min_dfas: BTreeMap<String, Dfa>,
    mode_transitions: ModeTransitions,
) -> Result<GeneratorOutput> {
    let mut mode_names: Vec<String> = min_dfas.keys().cloned().collect();
    mode_names.sort_by(|a, b| match (a.as_str(), b.as_str()) {
        ("main", "main") => std::cmp::Ordering::Equal,
        ("main", _) => std::cmp::Ordering::Less,
        (_, "main") => std::cmp::Ordering::Greater,
        _ => a.cmp(b),
    });

    let mut transitions: BTreeMap<NodeID, [Option<NodeID>; 256]> = BTreeMap::new();
    let mut match_names: BTreeMap<NodeID, String> = BTreeMap::new();
    let mut literal_rules = std::collections::BTreeSet::new();
    let mut node_modes: BTreeMap<NodeID, String> = BTreeMap::new();
    let mut per_mode_meta: BTreeMap<String, (NodeID, NodeID, String)> = BTreeMap::new();

    let mut next_id: NodeIDBase = 0;
    for mode_name in &mode_names {
        let dfa = &min_dfas[mode_name];
        let mut remap: BTreeMap<NodeID, NodeID> = BTreeMap::new();
        for old in dfa.nodes() {
            let new_id = NodeID::new(next_id);
            next_id += 1;
            remap.insert(old, new_id);
            node_modes.insert(new_id, mode_name.clone());
        }

        for (old_src, row) in &dfa.transitions {
            let new_src = remap[old_src];
            let mut new_row = [None; 256];
            for (byte, target) in row.iter().enumerate() {
                if let Some(old_dst) = target {
                    new_row[byte] = Some(remap[old_dst]);
                }
            }
            transitions.insert(new_src, new_row);
        }

        for (old, name) in &dfa.match_names {
            match_names.insert(remap[old], name.clone());
        }

        literal_rules.extend(dfa.literal_rules.iter().cloned());

        let start = remap[&crate::internal::ids::START];
        let invalid = remap[&crate::internal::ids::INVALID];
        let invalid_name = dfa.match_names[&crate::internal::ids::INVALID].clone();
        per_mode_meta.insert(mode_name.clone(), (start, invalid, invalid_name));
    }

    let modes = build_modes(&mode_names, &per_mode_meta);

    log::debug!(
        "combined DFA: {} modes, {} nodes, {} rules",
        modes.len(),
        next_id,
        match_names.len()
    );

    Ok(GeneratorOutput {
        dfa: CombinedDfa {
            transitions,
            match_names,
            literal_rules,
            num_nodes: next_id,
        },
        modes,
        node_modes,
        mode_transitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_mode_word_and_whitespace() {
        let output = GeneratorBuilder::new()
            .mode(
                "main",
                vec![
                    (
                        "word".to_string(),
                        Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'a', b'z')]))),
                    ),
                    ("ws".to_string(), Pattern::Plus(Box::new(Pattern::Char(b' ')))),
                ],
            )
            .build()
            .unwrap();
        assert_eq!(output.modes.len(), 1);
        assert_eq!(output.modes[0].name, "main");
    }

    #[test]
    fn rule_name_reused_in_two_modes_is_an_error() {
        let result = GeneratorBuilder::new()
            .mode("main", vec![("x".to_string(), Pattern::Char(b'a'))])
            .mode("sub", vec![("x".to_string(), Pattern::Char(b'b'))])
            .build();
        assert!(matches!(result, Err(Error::RuleNameCollision(_))));
    }

    #[test]
    fn trivial_match_is_rejected() {
        let result = GeneratorBuilder::new()
            .mode(
                "main",
                vec![("r".to_string(), Pattern::Star(Box::new(Pattern::Char(b'a'))))],
            )
            .build();
        assert!(matches!(result, Err(Error::TrivialMatch(_))));
    }

    #[test]
    fn main_mode_is_sorted_first() {
        let output = GeneratorBuilder::new()
            .mode("alpha", vec![("a".to_string(), Pattern::Char(b'a'))])
            .mode("main", vec![("m".to_string(), Pattern::Char(b'm'))])
            .mode("zeta", vec![("z".to_string(), Pattern::Char(b'z'))])
            .build()
            .unwrap();
        let names: Vec<&str> = output.modes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["main", "alpha", "zeta"]);
    }
}
