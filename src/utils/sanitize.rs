//! Utilities for sanitizing untrusted request input.
//!
//! Header values are attacker-controlled. Control characters are removed and
//! long values truncated before they are stored in a visitor record, so the
//! log and its CSV mirror stay line-oriented and bounded.

use crate::config::MAX_HEADER_VALUE_LENGTH;

/// Removes control characters from a value.
///
/// Control characters (0x00-0x1F and 0x7F) are dropped, tab excepted.
/// Non-ASCII characters are kept.
pub fn strip_control_chars(value: &str) -> String {
    value
        .chars()
        .filter(|c| {
            let code = *c as u32;
            (code >= 0x20 && code != 0x7F) || code == 0x09
        })
        .collect()
}

/// Truncates `value` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

/// Sanitizes a header value for auditing: strips control characters, trims and
/// truncates to `MAX_HEADER_VALUE_LENGTH`.
pub fn sanitize_header_value(value: &str) -> String {
    let stripped = strip_control_chars(value);
    truncate_chars(stripped.trim(), MAX_HEADER_VALUE_LENGTH)
}
