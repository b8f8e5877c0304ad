//! Internal automaton machinery: none of this module's types are part of the public API. The
//! public surface (`pattern`, `mode`, `generator`, `lexer`) is built on top of it.

/// Module for the `NodeID` id type.
pub(crate) mod ids;

/// Module with the NFA builder and NFA graph operations (C2/C3).
pub(crate) mod nfa;

/// Module with the fat DFA constructor and DFA graph operations (C4/C6).
pub(crate) mod dfa;

/// Module with the Hopcroft-style DFA minimizer (C5).
pub(crate) mod minimizer;

/// Module with automaton shape statistics (§13).
pub mod stats;

/// Module with graphviz `dot` rendering of NFAs and DFAs.
#[cfg(feature = "dot_writer")]
pub(crate) mod dot;
