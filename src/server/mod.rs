//! HTTP server for the maintenance page and the visitor log API.
//!
//! Endpoints:
//! - `GET /` - maintenance page, records a page view
//! - `POST /api/collect` - client signal collection
//! - `POST /api/beacon` - unload beacon, always `204`
//! - `GET /api/logs` / `DELETE /api/logs` - recent records with stats / clear
//! - `GET /api/logs/csv` - CSV mirror download
//! - `GET /api/stats` - hourly buckets and unique visitors
//! - `GET /api/debug` - what the resolver sees for this request
//! - `GET /health` - liveness

mod handlers;
mod types;

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::{Config, MAX_COLLECT_BODY_BYTES};
use crate::initialization::init_state;
use handlers::{
    beacon_handler, clear_logs_handler, collect_handler, csv_handler, debug_handler,
    health_handler, logs_handler, page_handler, stats_handler,
};
pub use types::AppState;

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/api/collect", post(collect_handler))
        .route("/api/beacon", post(beacon_handler))
        .route("/api/logs", get(logs_handler).delete(clear_logs_handler))
        .route("/api/logs/csv", get(csv_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/debug", get(debug_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_COLLECT_BODY_BYTES))
        .with_state(state)
}

/// Serves `state` on an already-bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), anyhow::Error> {
    serve_with_shutdown(listener, state, std::future::pending()).await
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), anyhow::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Resolves on Ctrl+C (or SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received, draining connections");
}

/// Initializes shared state from `config`, binds and serves.
pub async fn start_server(config: &Config) -> Result<(), anyhow::Error> {
    let state = init_state(config)
        .await
        .context("Failed to initialize server state")?;

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to {}: {}", addr, e))?;

    log::info!("Visitor log listening on http://{}/", addr);
    log::info!("  - Logs: http://{}/api/logs", addr);
    log::info!("  - Health: http://{}/health", addr);

    serve_with_shutdown(listener, state, shutdown_signal()).await
}
