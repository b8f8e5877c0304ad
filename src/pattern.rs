//! Module with the pattern IR and its methods.
//!
//! A [`Pattern`] is a tagged tree of regex constructs over the byte alphabet. It carries no
//! knowledge of match naming; the [`crate::internal::nfa`] builder is the one that assigns
//! match names to the nodes a pattern's [`Pattern::emit_nfa`] call produces.

use crate::internal::ids::NodeID;
use crate::internal::nfa::NfaBuilder;

/// A regular pattern over the byte alphabet.
///
/// Every variant implements three capabilities: [`Pattern::emit_nfa`] (add transitions to a
/// builder so the pattern is accepted exactly between two given nodes), [`Pattern::is_literal`]
/// (true only for patterns that match exactly one byte sequence) and [`Pattern::describe`] (a
/// human-readable rendering used by diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Matches a single, specific byte.
    Char(u8),
    /// Matches a single byte drawn from a sorted list of disjoint, inclusive ranges.
    CharClass(Vec<(u8, u8)>),
    /// Matches its children in order.
    Seq(Vec<Pattern>),
    /// Matches any one of its children.
    Alt(Vec<Pattern>),
    /// Matches its child zero or one times.
    Opt(Box<Pattern>),
    /// Matches its child zero or more times.
    Star(Box<Pattern>),
    /// Matches its child one or more times.
    Plus(Box<Pattern>),
}

impl Pattern {
    /// Convenience constructor for a literal byte string, expressed as `Seq` of `Char`.
    pub fn literal(bytes: &[u8]) -> Self {
        Pattern::Seq(bytes.iter().map(|b| Pattern::Char(*b)).collect())
    }

    /// Adds transitions to `builder` such that the pattern is accepted iff it transitions from
    /// `src` to `dst`. May allocate fresh intermediate nodes via `builder.mk_node()`.
    pub(crate) fn emit_nfa(&self, builder: &mut NfaBuilder, src: NodeID, dst: NodeID) {
        match self {
            Pattern::Char(b) => builder.add_byte_transition(src, *b, *b, dst),
            Pattern::CharClass(ranges) => {
                for (lo, hi) in ranges {
                    builder.add_byte_transition(src, *lo, *hi, dst);
                }
            }
            Pattern::Seq(children) => match children.as_slice() {
                [] => builder.add_epsilon(src, dst),
                [only] => only.emit_nfa(builder, src, dst),
                [first, rest @ ..] => {
                    let mut cur = builder.mk_node();
                    first.emit_nfa(builder, src, cur);
                    for (i, child) in rest.iter().enumerate() {
                        if i == rest.len() - 1 {
                            child.emit_nfa(builder, cur, dst);
                        } else {
                            let next = builder.mk_node();
                            child.emit_nfa(builder, cur, next);
                            cur = next;
                        }
                    }
                }
            },
            Pattern::Alt(children) => {
                for child in children {
                    child.emit_nfa(builder, src, dst);
                }
            }
            Pattern::Opt(child) => {
                builder.add_epsilon(src, dst);
                child.emit_nfa(builder, src, dst);
            }
            Pattern::Star(child) => {
                let loop_node = builder.mk_node();
                builder.add_epsilon(src, loop_node);
                builder.add_epsilon(loop_node, dst);
                child.emit_nfa(builder, loop_node, loop_node);
            }
            Pattern::Plus(child) => {
                // Exactly like `Star`, except the first pass through `child` is mandatory:
                // `src` only reaches `loop_node` by matching `child` once.
                let loop_node = builder.mk_node();
                builder.add_epsilon(loop_node, dst);
                child.emit_nfa(builder, loop_node, loop_node);
                child.emit_nfa(builder, src, loop_node);
            }
        }
    }

    /// True only for patterns that match exactly one byte sequence (atoms and sequences
    /// thereof).
    pub fn is_literal(&self) -> bool {
        match self {
            Pattern::Char(_) => true,
            Pattern::CharClass(ranges) => {
                ranges.len() == 1 && ranges[0].0 == ranges[0].1
            }
            Pattern::Seq(children) => children.iter().all(Pattern::is_literal),
            Pattern::Alt(_) | Pattern::Opt(_) | Pattern::Star(_) | Pattern::Plus(_) => false,
        }
    }

    /// The single byte sequence this pattern matches, or `None` if it is not literal.
    pub fn literal_bytes(&self) -> Option<Vec<u8>> {
        if !self.is_literal() {
            return None;
        }
        match self {
            Pattern::Char(b) => Some(vec![*b]),
            Pattern::CharClass(ranges) => Some(vec![ranges[0].0]),
            Pattern::Seq(children) => {
                let mut out = Vec::with_capacity(children.len());
                for child in children {
                    out.extend(child.literal_bytes()?);
                }
                Some(out)
            }
            _ => None,
        }
    }

    /// A human-readable rendering of the pattern, used by diagnostics and `Display`.
    pub fn describe(&self) -> String {
        match self {
            Pattern::Char(b) => Self::escape_byte(*b),
            Pattern::CharClass(ranges) => {
                let inner: Vec<String> = ranges
                    .iter()
                    .map(|(lo, hi)| {
                        if lo == hi {
                            Self::escape_byte(*lo)
                        } else {
                            format!("{}-{}", Self::escape_byte(*lo), Self::escape_byte(*hi))
                        }
                    })
                    .collect();
                format!("[{}]", inner.join(""))
            }
            Pattern::Seq(children) => children
                .iter()
                .map(Pattern::describe)
                .collect::<Vec<_>>()
                .join(""),
            Pattern::Alt(children) => {
                let inner: Vec<String> = children.iter().map(Pattern::describe).collect();
                format!("({})", inner.join("|"))
            }
            Pattern::Opt(child) => format!("{}?", Self::parenthesize(child)),
            Pattern::Star(child) => format!("{}*", Self::parenthesize(child)),
            Pattern::Plus(child) => format!("{}+", Self::parenthesize(child)),
        }
    }

    fn parenthesize(child: &Pattern) -> String {
        match child {
            Pattern::Char(_) | Pattern::CharClass(_) => child.describe(),
            _ => format!("({})", child.describe()),
        }
    }

    fn escape_byte(b: u8) -> String {
        let c = b as char;
        if c.is_ascii_graphic() && !"\\[]()|*+?".contains(c) {
            c.to_string()
        } else {
            format!("\\x{:02x}", b)
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}
