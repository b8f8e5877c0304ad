//! This module contains the DFA implementation: the fat (pre-minimization) deterministic
//! automaton produced from an [`crate::internal::nfa::Nfa`] by subset construction, and the
//! deterministic graph operations shared by the fat and minimized DFAs.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{Error, Result};
use crate::internal::ids::{NodeID, NodeIDBase, INVALID, START};
use crate::internal::nfa::Nfa;

/// A deterministic finite automaton: total on the byte alphabet for every reachable node after
/// sink completion, carrying exactly one match name per match node.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dfa {
    pub(crate) transitions: BTreeMap<NodeID, [Option<NodeID>; 256]>,
    pub(crate) match_names: BTreeMap<NodeID, String>,
    pub(crate) literal_rules: BTreeSet<String>,
    pub(crate) num_nodes: NodeIDBase,
}

impl Dfa {
    pub(crate) fn num_nodes(&self) -> NodeIDBase {
        self.num_nodes
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeID> + '_ {
        (0..self.num_nodes).map(NodeID::new)
    }

    /// `transitions[node][byte]` if present.
    pub(crate) fn advance(&self, node: NodeID, byte: u8) -> Option<NodeID> {
        self.transitions.get(&node).and_then(|row| row[byte as usize])
    }

    /// Single-walk simulation; `None` on the first byte with no outgoing edge, otherwise the
    /// match name at the final node, if any.
    pub(crate) fn match_bytes(&self, text: &[u8]) -> Option<&str> {
        let mut node = START;
        for &byte in text {
            node = self.advance(node, byte)?;
        }
        self.match_names.get(&node).map(String::as_str)
    }

    /// Nodes from which a match node is reachable without passing through another match node
    /// first: the "tail" of a pattern, used by [`Dfa::post_match_nodes`]'s complement.
    pub(crate) fn pre_match_nodes(&self) -> BTreeSet<NodeID> {
        let mut pre = BTreeSet::new();
        for (&node, row) in &self.transitions {
            for target in row.iter().flatten() {
                if self.match_names.contains_key(target) {
                    pre.insert(node);
                }
            }
        }
        pre
    }

    /// Nodes reachable *from* a match node that are themselves not match nodes: a sign of
    /// over-specified patterns (a rule whose automaton keeps running after an accept).
    pub(crate) fn post_match_nodes(&self) -> BTreeSet<NodeID> {
        let mut seen = BTreeSet::new();
        let mut worklist: Vec<NodeID> = self.match_names.keys().copied().collect();
        let mut visited: BTreeSet<NodeID> = BTreeSet::new();
        while let Some(node) = worklist.pop() {
            if !visited.insert(node) {
                continue;
            }
            if let Some(row) = self.transitions.get(&node) {
                for target in row.iter().flatten() {
                    if !self.match_names.contains_key(target) {
                        seen.insert(*target);
                        worklist.push(*target);
                    } else if !visited.contains(target) {
                        worklist.push(*target);
                    }
                }
            }
        }
        seen
    }
}

/// A mutable scratch structure for subset construction, tracking the NFA-state-set to DFA-node
/// mapping so equal subsets collapse to one node.
struct DfaBuilder<'a> {
    nfa: &'a Nfa,
    subset_ids: BTreeMap<BTreeSet<NodeID>, NodeID>,
    subsets: Vec<BTreeSet<NodeID>>,
    transitions: BTreeMap<NodeID, [Option<NodeID>; 256]>,
}

impl<'a> DfaBuilder<'a> {
    fn new(nfa: &'a Nfa) -> Self {
        Self {
            nfa,
            subset_ids: BTreeMap::new(),
            subsets: Vec::new(),
            transitions: BTreeMap::new(),
        }
    }

    fn id_for(&mut self, subset: BTreeSet<NodeID>) -> NodeID {
        if let Some(&id) = self.subset_ids.get(&subset) {
            return id;
        }
        let id = NodeID::new(self.subsets.len() as NodeIDBase);
        self.subset_ids.insert(subset.clone(), id);
        self.subsets.push(subset);
        id
    }
}

/// Builds the fat DFA for one mode from its NFA via subset construction, per the generator's
/// construction algorithm: `S0` and `S_invalid` are numbered 0 and 1 before any other subset is
/// discovered, the start node is sink-completed over the full byte alphabet, and names are
/// coalesced with literal bias, raising [`Error::Ambiguity`] or [`Error::LiteralCollision`] on a
/// tie between two rules of the same literal-ness at one node.
pub(crate) fn construct_fat_dfa(nfa: &Nfa) -> Result<Dfa> {
    let mut builder = DfaBuilder::new(nfa);

    let s0 = nfa.epsilon_closure([START]);
    let s_invalid: BTreeSet<NodeID> = [INVALID].into_iter().collect();
    let id0 = builder.id_for(s0.clone());
    let id_invalid = builder.id_for(s_invalid.clone());
    debug_assert_eq!(id0, START);
    debug_assert_eq!(id_invalid, INVALID);

    let mut worklist = vec![id0, id_invalid];
    let mut visited = BTreeSet::new();

    while let Some(node) = worklist.pop() {
        if !visited.insert(node) {
            continue;
        }
        let subset = builder.subsets[node.as_usize()].clone();
        let mut row: [Option<NodeID>; 256] = [None; 256];
        for byte in 0u16..256 {
            let byte = byte as u8;
            let target = nfa.advance(&subset, byte);
            if target.is_empty() {
                continue;
            }
            let target_id = builder.id_for(target);
            row[byte as usize] = Some(target_id);
            if !visited.contains(&target_id) {
                worklist.push(target_id);
            }
        }
        builder.transitions.insert(node, row);
    }

    // Sink completion: only the start node gets an explicit edge to invalid for every byte that
    // has none yet. Invalid mirrors that same set of bytes back onto itself — it must NOT
    // self-loop on every byte, only on the bytes that are themselves invalid from the start
    // node. Otherwise a single invalid byte would swallow all following input (including input
    // that would otherwise match a real rule) into one invalid run instead of stopping after one
    // byte, as the runtime's last-accept-fallback loop expects.
    let mut invalid_bytes: Vec<u8> = Vec::new();
    {
        let start_row = builder.transitions.entry(START).or_insert([None; 256]);
        for (byte, slot) in start_row.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(INVALID);
                invalid_bytes.push(byte as u8);
            }
        }
    }
    {
        let invalid_row = builder.transitions.entry(INVALID).or_insert([None; 256]);
        for byte in invalid_bytes {
            invalid_row[byte as usize] = Some(INVALID);
        }
    }

    let num_nodes = builder.subsets.len() as NodeIDBase;
    let mut match_names = BTreeMap::new();
    for (subset, &node) in &builder.subset_ids {
        if node == INVALID {
            continue;
        }
        let mut names: BTreeSet<&String> = subset
            .iter()
            .filter(|&&n| n != INVALID)
            .filter_map(|n| nfa.match_names.get(n))
            .collect();
        if names.is_empty() {
            continue;
        }
        let literal: BTreeSet<&String> = names
            .iter()
            .filter(|n| nfa.literal_rules.contains(n.as_str()))
            .copied()
            .collect();
        if !literal.is_empty() {
            names = literal;
        }
        let mut sorted: Vec<&String> = names.into_iter().collect();
        sorted.sort();
        if sorted.len() > 1 {
            let a = sorted[0].clone();
            let b = sorted[1].clone();
            return Err(if nfa.literal_rules.contains(&a) {
                Error::LiteralCollision(a, b)
            } else {
                Error::Ambiguity(a, b)
            });
        }
        match_names.insert(node, sorted[0].clone());
    }
    match_names.insert(INVALID, nfa.match_names[&INVALID].clone());

    log::debug!(
        "fat DFA: {} nodes, {} matches",
        num_nodes,
        match_names.len().saturating_sub(1)
    );

    Ok(Dfa {
        transitions: builder.transitions,
        match_names,
        literal_rules: nfa.literal_rules.clone(),
        num_nodes,
    })
}
