//! This module contains the NFA (nondeterministic finite automaton) implementation: the mutable
//! builder that a [`crate::pattern::Pattern`]'s `emit_nfa` writes into, and the frozen [`Nfa`]
//! it produces.

use std::collections::{BTreeMap, BTreeSet};

use crate::pattern::Pattern;

use super::ids::{NodeID, NodeIDBase, INVALID, START};

/// Mutable scratch structure that a mode's patterns are compiled into. Node 0 (start) and node 1
/// (invalid, unreachable from node 0) are allocated up front; every further node is allocated on
/// demand via [`NfaBuilder::mk_node`].
#[derive(Debug, Default)]
pub(crate) struct NfaBuilder {
    next_id: NodeIDBase,
    epsilons: BTreeMap<NodeID, BTreeSet<NodeID>>,
    bytes: BTreeMap<NodeID, Vec<(u8, u8, NodeID)>>,
}

impl NfaBuilder {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 2,
            epsilons: BTreeMap::new(),
            bytes: BTreeMap::new(),
        }
    }

    /// Allocates a fresh node id.
    pub(crate) fn mk_node(&mut self) -> NodeID {
        let id = NodeID::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds an epsilon transition `from -> to`.
    pub(crate) fn add_epsilon(&mut self, from: NodeID, to: NodeID) {
        self.epsilons.entry(from).or_default().insert(to);
    }

    /// Adds a byte-range transition `from --[lo,hi]--> to`.
    pub(crate) fn add_byte_transition(&mut self, from: NodeID, lo: u8, hi: u8, to: NodeID) {
        self.bytes.entry(from).or_default().push((lo, hi, to));
    }

    /// Freezes the builder into an [`Nfa`], attaching match names and the literal-rule set.
    pub(crate) fn finalize(
        self,
        match_names: BTreeMap<NodeID, String>,
        literal_rules: BTreeSet<String>,
    ) -> Nfa {
        Nfa {
            epsilons: self.epsilons,
            bytes: self.bytes,
            match_names,
            literal_rules,
            num_nodes: self.next_id,
        }
    }
}

/// A nondeterministic finite automaton for one lexer mode: one NFA fragment per named pattern,
/// all sharing the single start node 0. Immutable once built; pure and side-effect free in every
/// operation below.
#[derive(Debug, Clone, Default)]
pub(crate) struct Nfa {
    epsilons: BTreeMap<NodeID, BTreeSet<NodeID>>,
    bytes: BTreeMap<NodeID, Vec<(u8, u8, NodeID)>>,
    pub(crate) match_names: BTreeMap<NodeID, String>,
    pub(crate) literal_rules: BTreeSet<String>,
    num_nodes: NodeIDBase,
}

impl Nfa {
    /// Builds the NFA for one mode from its named patterns. Patterns are sorted lexically by
    /// name before node allocation so that output is deterministic regardless of the order the
    /// caller supplied them in.
    pub(crate) fn from_patterns(mode_name: &str, patterns: &[(String, Pattern)]) -> Self {
        let mut sorted: Vec<&(String, Pattern)> = patterns.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut builder = NfaBuilder::new();
        let mut match_names = BTreeMap::new();
        let mut literal_rules = BTreeSet::new();

        let invalid_name = if mode_name == "main" {
            "invalid".to_string()
        } else {
            format!("{}_invalid", mode_name)
        };
        match_names.insert(INVALID, invalid_name);

        for (name, pattern) in sorted {
            let m = builder.mk_node();
            pattern.emit_nfa(&mut builder, START, m);
            match_names.insert(m, name.clone());
            if pattern.is_literal() {
                literal_rules.insert(name.clone());
            }
        }

        log::debug!(
            "mode '{}': built NFA with {} nodes, {} rules",
            mode_name,
            builder.next_id,
            match_names.len().saturating_sub(1)
        );

        builder.finalize(match_names, literal_rules)
    }

    pub(crate) fn num_nodes(&self) -> NodeIDBase {
        self.num_nodes
    }

    pub(crate) fn epsilon_transition_count(&self) -> usize {
        self.epsilons.values().map(BTreeSet::len).sum()
    }

    pub(crate) fn byte_transition_count(&self) -> usize {
        self.bytes.values().map(Vec::len).sum()
    }

    /// All epsilon edges, grouped by source node. Used only by the dot-writer diagnostics.
    #[cfg(feature = "dot_writer")]
    pub(crate) fn epsilon_edges(&self) -> impl Iterator<Item = (NodeID, &BTreeSet<NodeID>)> {
        self.epsilons.iter().map(|(&src, targets)| (src, targets))
    }

    /// All byte-range edges as `(src, lo, hi, dst)` tuples. Used only by the dot-writer
    /// diagnostics.
    #[cfg(feature = "dot_writer")]
    pub(crate) fn byte_edges(&self) -> impl Iterator<Item = (NodeID, u8, u8, NodeID)> + '_ {
        self.bytes
            .iter()
            .flat_map(|(&src, ranges)| ranges.iter().map(move |&(lo, hi, dst)| (src, lo, hi, dst)))
    }

    /// The smallest superset of `state` closed under epsilon-transitions.
    pub(crate) fn epsilon_closure<I: IntoIterator<Item = NodeID>>(&self, states: I) -> BTreeSet<NodeID> {
        let mut closure: BTreeSet<NodeID> = states.into_iter().collect();
        let mut worklist: Vec<NodeID> = closure.iter().copied().collect();
        while let Some(n) = worklist.pop() {
            if let Some(targets) = self.epsilons.get(&n) {
                for &t in targets {
                    if closure.insert(t) {
                        worklist.push(t);
                    }
                }
            }
        }
        closure
    }

    /// The union of `transitions[n][byte]` for all `n` in `state`, then epsilon-closed. A byte
    /// with no outgoing edge at a given node contributes nothing.
    pub(crate) fn advance(&self, state: &BTreeSet<NodeID>, byte: u8) -> BTreeSet<NodeID> {
        let mut moved = BTreeSet::new();
        for &n in state {
            if let Some(ranges) = self.bytes.get(&n) {
                for &(lo, hi, target) in ranges {
                    if lo <= byte && byte <= hi {
                        moved.insert(target);
                    }
                }
            }
        }
        if moved.is_empty() {
            moved
        } else {
            self.epsilon_closure(moved)
        }
    }

    /// Simulates the NFA over the full byte string `text`, starting from the epsilon-closure of
    /// the start state. Returns the names matched by the final state (applying literal bias), or
    /// an empty vector if the text is not accepted by any rule.
    pub(crate) fn match_bytes(&self, text: &[u8]) -> Vec<String> {
        let mut state = self.epsilon_closure([START]);
        for &byte in text {
            if state.is_empty() {
                return Vec::new();
            }
            state = self.advance(&state, byte);
        }
        if state.is_empty() {
            return Vec::new();
        }
        self.names_at(&state)
    }

    fn names_at(&self, state: &BTreeSet<NodeID>) -> Vec<String> {
        let matched: Vec<&String> = state
            .iter()
            .filter_map(|n| self.match_names.get(n))
            .collect();
        let literal: BTreeSet<&String> = matched
            .iter()
            .filter(|n| self.literal_rules.contains(n.as_str()))
            .copied()
            .collect();
        if !literal.is_empty() {
            literal.into_iter().cloned().collect()
        } else {
            matched.into_iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
        }
    }

    /// Names of every rule that is trivially matched from the start state (accepts the empty
    /// input), sorted lexically. An empty list means the mode is valid.
    pub(crate) fn trivially_matched_rules(&self) -> Vec<String> {
        let start_closure = self.epsilon_closure([START]);
        let mut names: Vec<String> = self
            .match_names
            .iter()
            .filter(|(node, _)| **node != INVALID && start_closure.contains(node))
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Validates the NFA, rendering [`Nfa::trivially_matched_rules`] as plain diagnostic
    /// messages. Returns the list of messages; an empty list means the mode is valid.
    pub(crate) fn validate(&self) -> Vec<String> {
        self.trivially_matched_rules()
            .into_iter()
            .map(|name| format!("error: rule is trivially matched from start: {}", name))
            .collect()
    }
}
