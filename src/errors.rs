//! Module with error definitions.

use thiserror::Error;

/// The result type for the `autolex` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the `autolex` crate.
///
/// Every fatal condition from the generator's semantic checks and invariant assertions is one
/// variant of this enum; nothing in the generation path panics on caller-supplied pattern data.
/// The only panics reserved anywhere in this crate are the narrower "invariant violation" debug
/// assertions called out next to the checks that produce the matching `Error` variant below.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A rule is trivially matched from the start of its mode, i.e. the empty input already
    /// accepts it. Raised by [`crate::internal::nfa::Nfa::validate`].
    #[error("error: rule is trivially matched from start: {0}")]
    TrivialMatch(String),

    /// Two non-literal rules tie at the same fat-DFA node. Raised during name coalescing in
    /// [`crate::internal::dfa::construct_fat_dfa`].
    #[error("error: ambiguous rules match the same input: {0} and {1}")]
    Ambiguity(String, String),

    /// Two literal rules tie at the same fat-DFA node.
    #[error("error: literal rule collision: {0} and {1} match the same literal text")]
    LiteralCollision(String, String),

    /// The same rule name appears in more than one mode, violating the parser's contract that
    /// rule names are globally unique.
    #[error("error: rule name collision across modes: {0}")]
    RuleNameCollision(String),

    /// The minimizer produced two different successors for the same `(state, byte)` pair after
    /// rebuilding transitions through the class map. This should never happen because the
    /// partition refinement preserves transition determinism; it indicates a generator bug.
    #[error("invariant violation: minimizer produced inconsistent transitions for state {0} on byte {1}")]
    MinimizerInvariant(u32, u8),

    /// The lexer runtime made no progress advancing through the input. Only reachable if DFA
    /// construction's sink-completion step was skipped or produced an incomplete start state.
    #[error("invariant violation: lexer made no progress at position {0}")]
    NoProgress(usize),

    /// The NFA, fat DFA and minimized DFA disagreed on the match for the same input. Surfaced by
    /// [`crate::testing::cross_check_match`]; indicates one of the three automata was built
    /// inconsistently with the others.
    #[error("cross-check mismatch: {0}")]
    CrossCheckMismatch(String),
}
