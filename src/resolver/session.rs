//! Visitor session identifiers.

use axum::http::HeaderMap;
use chrono::Utc;

use crate::config::HEADER_COOKIE;

const MAX_SESSION_ID_LENGTH: usize = 128;

/// `sess_<millis hex>_<random hex>`. Not a security token; collisions are
/// merely unlikely.
pub fn generate_session_id() -> String {
    format!(
        "sess_{:x}_{:x}",
        Utc::now().timestamp_millis(),
        rand::random::<u64>()
    )
}

/// Session id from the `name` cookie, if present and well-formed.
pub fn session_from_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(HEADER_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| is_valid_session_id(value))
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
