//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - GeoIP databases
//! - Visitor storage backend and CSV mirror
//! - The shared server state
//!
//! All initialization functions return proper error types for error handling.

mod logger;

use std::sync::Arc;

use crate::config::{Config, StorageBackend, CSV_LOG_FILE, JSONL_LOG_FILE, SQLITE_DB_FILE};
use crate::error_handling::InitializationError;
use crate::geoip::GeoDatabase;
use crate::resolver::Resolver;
use crate::server::AppState;
use crate::storage::{CsvMirror, JsonlStore, SqliteStore, VisitorStore};

// Re-export public API
pub use logger::init_logger_with;

/// Opens the configured storage backend inside `config.data_dir`.
///
/// Creates the data directory if it does not exist.
pub async fn init_store(config: &Config) -> Result<Arc<dyn VisitorStore>, InitializationError> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|e| InitializationError::StorageError(e.into()))?;

    let store: Arc<dyn VisitorStore> = match config.storage {
        StorageBackend::Jsonl => Arc::new(JsonlStore::new(config.data_dir.join(JSONL_LOG_FILE))),
        StorageBackend::Sqlite => {
            Arc::new(SqliteStore::open(&config.data_dir.join(SQLITE_DB_FILE)).await?)
        }
    };

    log::info!(
        "Visitor records stored with the {} backend in {}",
        config.storage,
        config.data_dir.display()
    );
    Ok(store)
}

/// Loads the GeoIP databases named in the config.
///
/// Missing paths disable lookups (every lookup misses); a path that exists but
/// cannot be parsed is an error.
pub async fn init_geoip(config: &Config) -> Result<GeoDatabase, InitializationError> {
    GeoDatabase::open(config.geoip_city.as_deref(), config.geoip_asn.as_deref())
        .await
        .map_err(|e| InitializationError::GeoIpError(format!("{:#}", e)))
}

/// Builds the shared server state from the config.
pub async fn init_state(config: &Config) -> Result<AppState, InitializationError> {
    let store = init_store(config).await?;
    let geo = init_geoip(config).await?;
    let resolver = Resolver::new(Arc::new(geo)).with_vpn_prefixes(config.vpn_prefixes.clone());
    let csv = CsvMirror::new(config.data_dir.join(CSV_LOG_FILE));

    Ok(AppState::new(
        store,
        csv,
        resolver,
        config.recent_limit,
        &config.session_cookie,
    ))
}
