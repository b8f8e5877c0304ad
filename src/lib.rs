#![forbid(missing_docs)]
//! # `autolex`
//! `autolex` is a lexer generator library: it turns named regular patterns, grouped into modes
//! with mode-transition rules, into a table-driven tokenizer.
//!
//! The pipeline is a straight line: pattern IR ([`Pattern`]) is compiled per mode into an NFA,
//! then a deterministic "fat" DFA via subset construction, then minimized, then every mode's
//! minimized DFA is renumbered and unioned into one [`generator::CombinedDfa`]. A
//! [`lexer::Lexer`] walks that combined DFA byte by byte over a [`lexer::Source`], maintaining a
//! pushdown stack of active modes.
//!
//! Unlike a regex-text-driven scanner, this crate never parses pattern syntax itself: callers
//! build [`Pattern`] trees directly (or generate them from their own parser) and hand them to a
//! [`generator::GeneratorBuilder`].

/// Module with error definitions.
mod errors;
pub use errors::{Error, Result};

/// The module with internal automaton implementation details: NFA, DFA, minimizer, statistics.
mod internal;
pub use internal::stats::Stats;

/// Module with the pattern IR.
mod pattern;
pub use pattern::Pattern;

/// Module that provides the position type.
mod position;
pub use position::{Position, PositionProvider};

/// Module that provides the span type.
mod span;
pub use span::Span;

/// Module with the `Mode` record and the mode-transition table type.
mod mode;
pub use mode::{Mode, ModeTransitions};

/// Module with the top-level generator builder and its output artifacts.
mod generator;
pub use generator::{CombinedDfa, GeneratorBuilder, GeneratorOutput};

/// Module with the lexer runtime, `Source`, and `Token`.
mod lexer;
pub use lexer::{Lexer, Source, Token};

/// Cross-check test harness comparing NFA, fat DFA and minimized DFA match results.
pub mod testing;
