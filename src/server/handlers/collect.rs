//! Client signal collection.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::super::types::{AppState, CollectResponse, ErrorResponse};
use super::{session_cookie, session_for, signals};
use crate::models::{CollectionSource, VisitorRecord};

/// Parses the body as JSON; empty or malformed bodies count as absent.
fn parse_body(body: &Bytes) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Ignoring malformed collection body ({} bytes): {}", body.len(), e);
            None
        }
    }
}

async fn record_visit(
    state: &AppState,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
    body: &Bytes,
    source: CollectionSource,
) -> (VisitorRecord, bool) {
    let (session_id, is_new) = session_for(state, headers);
    let body = parse_body(body);
    let record = state.resolver.resolve(
        &signals(headers, connect_info),
        body.as_ref(),
        source,
        session_id,
    );
    (record, is_new)
}

/// `POST /api/collect`
pub async fn collect_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            log::warn!("Rejected collection body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(ErrorResponse::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    let (record, is_new) =
        record_visit(&state, connect_info, &headers, &body, CollectionSource::Collect).await;

    if let Err(e) = state.persist(&record).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to store visit: {}", e))),
        )
            .into_response();
    }

    let mut response = Json(CollectResponse {
        success: true,
        session_id: record.session_id.clone(),
        timestamp: record.timestamp,
        ip: record.network.ip.clone(),
        is_localhost: record.network.is_localhost,
    })
    .into_response();

    if is_new {
        if let Some(cookie) = session_cookie(&state.session_cookie, &record.session_id) {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
    }
    response
}

/// `POST /api/beacon`: unload beacon. The browser ignores the answer, so it
/// is always `204`. An unreadable or oversized body still records a
/// header-only visit.
pub async fn beacon_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    let body = body.unwrap_or_else(|rejection| {
        log::debug!("Dropping beacon body: {}", rejection.body_text());
        Bytes::new()
    });
    let (record, _) =
        record_visit(&state, connect_info, &headers, &body, CollectionSource::Beacon).await;
    let _ = state.persist(&record).await;
    StatusCode::NO_CONTENT
}
