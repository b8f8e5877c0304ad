//! Graphviz `dot` rendering of NFAs and DFAs, for debugging automata by eye. Gated behind the
//! `dot_writer` feature; never consulted by the matching path.

use std::io::Write;

use dot_writer::{Attributes, Color, DotWriter, RankDirection, Shape};

use super::dfa::Dfa;
use super::ids::{NodeID, INVALID, START};
use super::nfa::Nfa;

/// Renders `nfa` as a graphviz digraph, labeling the start node and every match node. Node `i`
/// is emitted as the `i`-th auto-named node, so edges below reference it as `node_{i}`.
pub(crate) fn nfa_render<W: Write>(nfa: &Nfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph.set_label(label).set_rank_direction(RankDirection::LeftRight);

    for raw in 0..nfa.num_nodes() {
        let id = NodeID::new(raw);
        let mut node = digraph.node_auto();
        node.set_label(&id.as_usize().to_string());
        if id == START {
            node.set_shape(Shape::Circle).set_color(Color::Blue).set_pen_width(3.0);
        }
        if let Some(name) = nfa.match_names.get(&id) {
            if id != INVALID {
                node.set_shape(Shape::DoubleCircle).set_color(Color::Red).set_label(name);
            }
        }
    }
    for (src, targets) in nfa.epsilon_edges() {
        for target in targets {
            digraph
                .edge(format!("node_{}", src.as_usize()), format!("node_{}", target.as_usize()))
                .attributes()
                .set_label("eps");
        }
    }
    for (src, lo, hi, target) in nfa.byte_edges() {
        let label = if lo == hi {
            format!("{:02x}", lo)
        } else {
            format!("{:02x}-{:02x}", lo, hi)
        };
        digraph
            .edge(format!("node_{}", src.as_usize()), format!("node_{}", target.as_usize()))
            .attributes()
            .set_label(&label);
    }
}

/// Renders `dfa` as a graphviz digraph, labeling the start node, invalid sink and every match
/// node. Adjacent bytes sharing a target are coalesced into one labeled edge.
pub(crate) fn dfa_render<W: Write>(dfa: &Dfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph.set_label(label).set_rank_direction(RankDirection::LeftRight);

    for id in dfa.nodes() {
        let mut node = digraph.node_auto();
        node.set_label(&id.as_usize().to_string());
        if id == START {
            node.set_shape(Shape::Circle).set_color(Color::Blue).set_pen_width(3.0);
        }
        if id == INVALID {
            node.set_shape(Shape::Square).set_color(Color::Black);
        }
        if let Some(name) = dfa.match_names.get(&id) {
            node.set_shape(Shape::DoubleCircle).set_color(Color::Red).set_label(name);
        }
    }
    for id in dfa.nodes() {
        for (lo, hi, target) in coalesced_ranges(dfa, id) {
            let label = if lo == hi {
                format!("{:02x}", lo)
            } else {
                format!("{:02x}-{:02x}", lo, hi)
            };
            digraph
                .edge(format!("node_{}", id.as_usize()), format!("node_{}", target.as_usize()))
                .attributes()
                .set_label(&label);
        }
    }
}

fn coalesced_ranges(dfa: &Dfa, id: NodeID) -> Vec<(u8, u8, NodeID)> {
    let mut ranges = Vec::new();
    let mut run: Option<(u8, u8, NodeID)> = None;
    for byte in 0u16..=255 {
        let target = dfa.advance(id, byte as u8);
        match (target, run) {
            (Some(t), Some((lo, hi, cur))) if t == cur && hi.checked_add(1) == Some(byte as u8) => {
                run = Some((lo, byte as u8, cur));
            }
            (Some(t), prev) => {
                if let Some(r) = prev {
                    ranges.push(r);
                }
                run = Some((byte as u8, byte as u8, t));
            }
            (None, prev) => {
                if let Some(r) = prev {
                    ranges.push(r);
                }
                run = None;
            }
        }
    }
    if let Some(r) = run {
        ranges.push(r);
    }
    ranges
}
