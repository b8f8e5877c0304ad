//! Module with the [`Mode`] record produced by the mode combiner and the public
//! [`ModeTransitions`] table that drives the lexer's mode stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::internal::ids::NodeID;

/// Describes one lexer mode within the combined DFA: where its sub-automaton starts, which node
/// is its invalid sink, and the two synthetic token kinds it emits for unmatched/unterminated
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// The mode's name, e.g. `"main"`.
    pub name: String,
    /// The node in the combined DFA at which this mode starts matching.
    pub start_node: NodeID,
    /// The node in the combined DFA that is this mode's invalid sink.
    pub invalid_node: NodeID,
    /// The token kind emitted for a byte that cannot extend any pattern in this mode.
    pub invalid_name: String,
    /// The token kind emitted when input runs out mid-pattern in this mode.
    pub incomplete_name: String,
}

impl Mode {
    fn incomplete_label(mode_name: &str) -> String {
        if mode_name == "main" {
            "incomplete".to_string()
        } else {
            format!("{}_incomplete", mode_name)
        }
    }
}

/// `(from_mode, emitted_kind) -> (to_mode, pop_kind)`. When the lexer emits a token of kind
/// `emitted_kind` while in `from_mode`, it pushes `(to_mode, pop_kind)` onto the mode stack, so
/// that later emitting `pop_kind` pops back out.
pub type ModeTransitions = BTreeMap<(String, String), (String, String)>;

pub(crate) fn build_modes(mode_names_in_order: &[String], per_mode: &BTreeMap<String, (NodeID, NodeID, String)>) -> Vec<Mode> {
    mode_names_in_order
        .iter()
        .map(|name| {
            let (start_node, invalid_node, invalid_name) = per_mode[name].clone();
            Mode {
                name: name.clone(),
                start_node,
                invalid_node,
                invalid_name,
                incomplete_name: Mode::incomplete_label(name),
            }
        })
        .collect()
}
