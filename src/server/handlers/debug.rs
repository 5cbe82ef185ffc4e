//! Request introspection for proxy setups.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};

use super::super::types::{AppState, DebugResponse};
use super::signals;
use crate::fingerprint::reference_canvas_hash;
use crate::resolver::{is_local_ip, IpCandidates};
use crate::utils::sanitize::sanitize_header_value;

/// `GET /api/debug`: what the resolver sees for this request.
pub async fn debug_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<DebugResponse> {
    let signals = signals(&headers, connect_info);
    let resolved = state.resolver.resolve_ip(&signals);
    let candidates =
        IpCandidates::from_request(signals.headers, signals.framework_ip, signals.peer);

    let mut all_headers = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = sanitize_header_value(&String::from_utf8_lossy(value.as_bytes()));
        all_headers
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let server_canvas_hash = match reference_canvas_hash() {
        Ok(hash) => Some(hash),
        Err(e) => {
            log::warn!("Reference canvas render failed: {}", e);
            None
        }
    };

    Json(DebugResponse {
        is_localhost: is_local_ip(&resolved.ip),
        ip: resolved.ip,
        ip_source: resolved.source,
        candidates: candidates.audit(),
        headers: all_headers,
        server_canvas_hash,
    })
}
