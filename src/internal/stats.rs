//! Diagnostic statistics for automata: node/match-node/transition counts, used by unit tests
//! that assert on automaton shape and by the optional dot-writer diagnostics. Never consulted by
//! the hot matching path.

use std::fmt;

use crate::internal::dfa::Dfa;
use crate::internal::nfa::Nfa;

/// Counts describing the shape of an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Total number of nodes.
    pub nodes: usize,
    /// Number of nodes that carry a match name.
    pub match_nodes: usize,
    /// Total number of transitions (epsilon and byte-range, for an NFA; byte, for a DFA).
    pub transitions: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} match nodes, {} transitions",
            self.nodes, self.match_nodes, self.transitions
        )
    }
}

impl Nfa {
    /// Counts of nodes, match nodes, and transitions (epsilon and byte-range combined).
    pub fn stats(&self) -> Stats {
        Stats {
            nodes: self.num_nodes() as usize,
            match_nodes: self.match_names.len(),
            transitions: self.epsilon_transition_count() + self.byte_transition_count(),
        }
    }
}

impl Dfa {
    /// Counts of nodes, match nodes, and defined byte transitions.
    pub fn stats(&self) -> Stats {
        let transitions = self
            .transitions
            .values()
            .map(|row| row.iter().filter(|t| t.is_some()).count())
            .sum();
        Stats {
            nodes: self.num_nodes() as usize,
            match_nodes: self.match_names.len(),
            transitions,
        }
    }
}
