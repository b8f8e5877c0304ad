//! This module contains the DFA minimizer: Hopcroft-style partition refinement with
//! match-name-preserving initial classes, plus the renumbering and transition-rebuild steps that
//! turn the refined partition back into a [`Dfa`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::errors::{Error, Result};
use crate::internal::dfa::Dfa;
use crate::internal::ids::{NodeID, NodeIDBase, INVALID, START};

type Class = BTreeSet<NodeID>;

/// Minimizes `dfa` via partition refinement. Distinct match names are never merged because each
/// match node starts life in its own singleton class; non-match nodes start in one shared class.
/// Classes are renumbered by the sorted tuple of their members' original ids, so the result does
/// not depend on the iteration order of any intermediate set.
pub(crate) fn minimize(dfa: &Dfa) -> Result<Dfa> {
    let mut classes: Vec<Class> = initial_partition(dfa);

    // node -> index into `classes`, kept in sync as classes split.
    let mut class_of: BTreeMap<NodeID, usize> = BTreeMap::new();
    for (i, class) in classes.iter().enumerate() {
        for &n in class {
            class_of.insert(n, i);
        }
    }

    let mut worklist: VecDeque<usize> = (0..classes.len()).collect();

    while let Some(splitter_idx) = worklist.pop_front() {
        if splitter_idx >= classes.len() {
            continue;
        }
        let splitter = classes[splitter_idx].clone();
        for byte in 0u16..256 {
            let byte = byte as u8;
            // X = { n : delta(n, byte) in splitter }
            let mut x: BTreeSet<NodeID> = BTreeSet::new();
            for node in dfa.nodes() {
                if let Some(target) = dfa.advance(node, byte) {
                    if splitter.contains(&target) {
                        x.insert(node);
                    }
                }
            }
            if x.is_empty() {
                continue;
            }
            let affected: BTreeSet<usize> = x.iter().filter_map(|n| class_of.get(n).copied()).collect();
            for class_idx in affected {
                let class = &classes[class_idx];
                let in_x: Class = class.intersection(&x).copied().collect();
                let out_x: Class = class.difference(&x).copied().collect();
                if in_x.is_empty() || out_x.is_empty() {
                    continue;
                }
                classes[class_idx] = in_x.clone();
                let new_idx = classes.len();
                classes.push(out_x.clone());
                for &n in &out_x {
                    class_of.insert(n, new_idx);
                }
                // Hopcroft's optimization would enqueue only the smaller half; both halves are
                // queued here for simplicity, which is still correct, only slower on adversarial
                // inputs.
                worklist.push_back(class_idx);
                worklist.push_back(new_idx);
            }
        }
    }

    classes.retain(|c| !c.is_empty());
    classes.sort_by(|a, b| {
        let sa: Vec<NodeID> = a.iter().copied().collect();
        let sb: Vec<NodeID> = b.iter().copied().collect();
        sa.cmp(&sb)
    });

    let mut remap: BTreeMap<NodeID, NodeID> = BTreeMap::new();
    for (new_id, class) in classes.iter().enumerate() {
        for &old in class {
            remap.insert(old, NodeID::new(new_id as NodeIDBase));
        }
    }

    let new_start = remap[&START];
    let new_invalid = remap[&INVALID];
    debug_assert_eq!(new_start, START, "start node must remain node 0 after minimization");
    debug_assert_eq!(new_invalid, INVALID, "invalid node must remain node 1 after minimization");

    let mut transitions: BTreeMap<NodeID, [Option<NodeID>; 256]> = BTreeMap::new();
    for (old_src, row) in &dfa.transitions {
        let new_src = remap[old_src];
        let entry = transitions.entry(new_src).or_insert([None; 256]);
        for (byte, target) in row.iter().enumerate() {
            if let Some(old_dst) = target {
                let new_dst = remap[old_dst];
                match entry[byte] {
                    Some(existing) if existing != new_dst => {
                        return Err(Error::MinimizerInvariant(new_src.id(), byte as u8));
                    }
                    _ => entry[byte] = Some(new_dst),
                }
            }
        }
    }

    let mut match_names = BTreeMap::new();
    for (old, name) in &dfa.match_names {
        match_names.insert(remap[old], name.clone());
    }

    log::debug!(
        "minimized DFA: {} nodes -> {} classes",
        dfa.num_nodes(),
        classes.len()
    );

    Ok(Dfa {
        transitions,
        match_names,
        literal_rules: dfa.literal_rules.clone(),
        num_nodes: classes.len() as NodeIDBase,
    })
}

fn initial_partition(dfa: &Dfa) -> Vec<Class> {
    let mut classes = Vec::new();
    let mut non_match: Class = BTreeSet::new();
    for node in dfa.nodes() {
        if dfa.match_names.contains_key(&node) {
            classes.push([node].into_iter().collect());
        } else {
            non_match.insert(node);
        }
    }
    if !non_match.is_empty() {
        classes.push(non_match);
    }
    classes
}
