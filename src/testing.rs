//! Reusable cross-check test harness (not a CLI): matches a string against a mode's NFA, fat DFA
//! and minimized DFA and confirms all three agree. Useful for asserting name-preservation and
//! subset-consistency whenever a new rule set is exercised in tests.

use crate::errors::{Error, Result};
use crate::internal::dfa::construct_fat_dfa;
use crate::internal::minimizer::minimize;
use crate::internal::nfa::Nfa;
use crate::pattern::Pattern;

/// Builds the NFA, fat DFA and minimized DFA for `patterns` and matches `text` against all
/// three. Returns the agreed-upon match name (`None` for no match), or
/// [`Error::CrossCheckMismatch`] if any two of the three disagree.
///
/// The NFA's result is reduced to a single name first: an ambiguous NFA match (more than one
/// name) is only valid if generation itself would have failed, so this helper treats it as "no
/// single name to compare" and only checks it against the DFA layers when it resolves to exactly
/// one name.
pub fn cross_check_match(mode_name: &str, patterns: &[(String, Pattern)], text: &[u8]) -> Result<Option<String>> {
    let nfa = Nfa::from_patterns(mode_name, patterns);
    let fat = construct_fat_dfa(&nfa)?;
    let min = minimize(&fat)?;

    let nfa_names = nfa.match_bytes(text);
    let fat_result = fat.match_bytes(text).map(str::to_string);
    let min_result = min.match_bytes(text).map(str::to_string);

    if fat_result != min_result {
        return Err(Error::CrossCheckMismatch(format!(
            "fat DFA said {:?} but minimized DFA said {:?} for {:?}",
            fat_result, min_result, text
        )));
    }

    if nfa_names.len() <= 1 {
        let nfa_result = nfa_names.into_iter().next();
        if nfa_result != fat_result {
            return Err(Error::CrossCheckMismatch(format!(
                "NFA said {:?} but fat DFA said {:?} for {:?}",
                nfa_result, fat_result, text
            )));
        }
    }

    Ok(fat_result)
}
