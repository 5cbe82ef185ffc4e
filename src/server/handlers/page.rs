//! Maintenance page.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
};

use super::super::types::AppState;
use super::{session_cookie, session_for, signals};
use crate::models::CollectionSource;

const MAINTENANCE_PAGE: &str = include_str!("../../../static/maintenance.html");

/// Serves the page and records a header-only visit. Storage failures are
/// logged and never change the response.
pub async fn page_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Response {
    let (session_id, is_new) = session_for(&state, &headers);
    let record = state.resolver.resolve(
        &signals(&headers, connect_info),
        None,
        CollectionSource::PageView,
        session_id.clone(),
    );
    // already logged by persist
    let _ = state.persist(&record).await;

    let mut response = Html(MAINTENANCE_PAGE).into_response();
    if is_new {
        if let Some(cookie) = session_cookie(&state.session_cookie, &session_id) {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
    }
    response
}
