//! HTTP handlers.

mod collect;
mod debug;
mod health;
mod logs;
mod page;
mod stats;

pub use collect::{beacon_handler, collect_handler};
pub use debug::debug_handler;
pub use health::health_handler;
pub use logs::{clear_logs_handler, csv_handler, logs_handler};
pub use page::page_handler;
pub use stats::stats_handler;

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderValue};

use crate::config::SESSION_COOKIE_MAX_AGE_SECS;
use crate::resolver::{generate_session_id, session_from_cookie, RequestSignals};

use super::types::AppState;

/// Session id for the request and whether it was newly minted.
fn session_for(state: &AppState, headers: &HeaderMap) -> (String, bool) {
    match session_from_cookie(headers, &state.session_cookie) {
        Some(id) => (id, false),
        None => (generate_session_id(), true),
    }
}

/// `Set-Cookie` value persisting `session_id` for a year.
fn session_cookie(name: &str, session_id: &str) -> Option<HeaderValue> {
    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, session_id, SESSION_COOKIE_MAX_AGE_SECS
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Not setting session cookie: {}", e);
            None
        }
    }
}

fn signals<'a>(
    headers: &'a HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> RequestSignals<'a> {
    RequestSignals {
        headers,
        peer: connect_info.map(|ConnectInfo(addr)| addr),
        framework_ip: None,
    }
}
