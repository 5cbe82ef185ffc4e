//! First-match-wins cascade over disagreeing signal providers.
//!
//! Each attribute of the reconciled record lists its providers in priority
//! order; the first value that is present, non-empty and not the `Unknown`
//! sentinel wins.

use crate::config::UNKNOWN;

/// Whether a provider value counts as an answer.
pub fn is_known(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case(UNKNOWN)
}

/// First known candidate, if any.
pub fn first_known_opt<I, S>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|c| is_known(c.as_ref()))
        .map(|c| c.as_ref().trim().to_string())
}

/// First known candidate, else the `Unknown` sentinel. Never empty.
pub fn first_known<I, S>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    first_known_opt(candidates).unwrap_or_else(|| UNKNOWN.to_string())
}
