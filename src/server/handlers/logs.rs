//! Log listing, clearing and CSV download.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Deserialize;

use super::super::types::{AppState, ClearResponse, ErrorResponse, LogsResponse};
use crate::config::{CSV_LOG_FILE, MAX_RECENT_LIMIT};
use crate::models::VisitorRecord;
use crate::storage::LogStats;

/// Query string of `GET /api/logs`. `limit` is parsed leniently: anything
/// that is not a positive integer means the default.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    limit: Option<String>,
}

impl LogsQuery {
    fn limit(&self, default: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default)
            .min(MAX_RECENT_LIMIT)
    }
}

fn storage_failure(context: &str, e: impl std::fmt::Display) -> Response {
    log::error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{}: {}", context, e))),
    )
        .into_response()
}

/// `GET /api/logs?limit=N`
pub async fn logs_handler(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let limit = query.limit(state.recent_limit);

    // one read so `total` and `logs` describe the same snapshot
    let all = match state.store.all().await {
        Ok(all) => all,
        Err(e) => return storage_failure("Failed to read visitor log", e),
    };
    let logs = newest_first(&all, limit);

    Json(LogsResponse {
        success: true,
        stats: LogStats::from_records(&all, Local::now().date_naive()),
        total: all.len(),
        logs,
    })
    .into_response()
}

/// Up to `limit` records of an oldest-first list, newest first.
fn newest_first(all: &[VisitorRecord], limit: usize) -> Vec<VisitorRecord> {
    all.iter().rev().take(limit).cloned().collect()
}

/// `DELETE /api/logs`
pub async fn clear_logs_handler(State(state): State<AppState>) -> Response {
    if let Err(e) = state.store.clear().await {
        return storage_failure("Failed to clear visitor log", e);
    }
    if let Err(e) = state.csv.clear().await {
        return storage_failure("Failed to clear CSV mirror", e);
    }
    log::info!("Visitor log cleared");

    Json(ClearResponse {
        success: true,
        message: "Visitor log cleared".to_string(),
    })
    .into_response()
}

/// `GET /api/logs/csv`
pub async fn csv_handler(State(state): State<AppState>) -> Response {
    match state.csv.read().await {
        Ok(Some(bytes)) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", CSV_LOG_FILE),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("No CSV log has been written yet")),
        )
            .into_response(),
        Err(e) => storage_failure("Failed to read CSV mirror", e),
    }
}
