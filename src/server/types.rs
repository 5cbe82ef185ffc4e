//! Server state and response bodies.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error_handling::StorageError;
use crate::models::{IpHeaderAudit, IpSource, VisitorRecord};
use crate::resolver::Resolver;
use crate::storage::{CsvMirror, HourlyStats, LogStats, VisitorStore};

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VisitorStore>,
    pub csv: CsvMirror,
    pub resolver: Resolver,
    /// Default `limit` of `GET /api/logs`
    pub recent_limit: usize,
    pub session_cookie: Arc<str>,
    pub start_time: Arc<Instant>,
    /// Records persisted since startup
    pub stored_records: Arc<AtomicUsize>,
    /// Appends that failed since startup
    pub failed_writes: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn VisitorStore>,
        csv: CsvMirror,
        resolver: Resolver,
        recent_limit: usize,
        session_cookie: &str,
    ) -> Self {
        Self {
            store,
            csv,
            resolver,
            recent_limit,
            session_cookie: Arc::from(session_cookie),
            start_time: Arc::new(Instant::now()),
            stored_records: Arc::new(AtomicUsize::new(0)),
            failed_writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Appends `record` to the store, then to the CSV mirror.
    ///
    /// Only the store decides success; a CSV failure is logged and ignored.
    pub async fn persist(&self, record: &VisitorRecord) -> Result<(), StorageError> {
        if let Err(e) = self.store.append(record).await {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            log::error!(
                "Failed to store {} visit from {}: {}",
                record.source,
                record.network.ip,
                e
            );
            return Err(e);
        }
        self.stored_records.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = self.csv.append(record).await {
            log::warn!(
                "Failed to mirror visit to {}: {}",
                self.csv.path().display(),
                e
            );
        }

        log::info!(
            "Stored {} visit from {} ({} {} on {})",
            record.source,
            record.network.ip,
            record.browser.name,
            record.browser.major,
            record.os.name
        );
        Ok(())
    }
}

/// `{success: false, error}` body used by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// JSON response for `POST /api/collect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub success: bool,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    pub is_localhost: bool,
}

/// JSON response for `GET /api/logs`
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub success: bool,
    pub stats: LogStats,
    pub total: usize,
    pub logs: Vec<VisitorRecord>,
}

/// JSON response for `GET /api/stats`
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: HourlyStats,
}

/// JSON response for `DELETE /api/logs`
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

/// JSON response for `GET /health`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub pid: u32,
    pub memory_rss_bytes: Option<u64>,
    pub version: &'static str,
    pub stored_records: usize,
    pub failed_writes: usize,
}

/// JSON response for `GET /api/debug`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub ip: String,
    pub ip_source: IpSource,
    pub is_localhost: bool,
    pub candidates: IpHeaderAudit,
    pub headers: BTreeMap<String, String>,
    /// Canvas hash rendered by the server's own raster surface
    pub server_canvas_hash: Option<i32>,
}
