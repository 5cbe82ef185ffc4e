//! Liveness endpoint.

use std::sync::atomic::Ordering;

use axum::{extract::State, Json};

use super::super::types::{AppState, HealthResponse};
use crate::utils::process::resident_memory_bytes;

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.start_time.elapsed().as_secs(),
        pid: std::process::id(),
        memory_rss_bytes: resident_memory_bytes(),
        version: env!("CARGO_PKG_VERSION"),
        stored_records: state.stored_records.load(Ordering::SeqCst),
        failed_writes: state.failed_writes.load(Ordering::SeqCst),
    })
}
