//! Hourly statistics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::{AppState, ErrorResponse, StatsResponse};
use crate::storage::HourlyStats;

/// `GET /api/stats`
pub async fn stats_handler(State(state): State<AppState>) -> Response {
    match state.store.all().await {
        Ok(records) => Json(StatsResponse {
            success: true,
            stats: HourlyStats::from_records(&records),
        })
        .into_response(),
        Err(e) => {
            log::error!("Failed to read visitor log for stats: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}
