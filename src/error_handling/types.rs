//! Error type definitions.

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error loading a GeoIP database.
    #[error("GeoIP initialization error: {0}")]
    GeoIpError(String),

    /// Error opening the configured storage backend.
    #[error("Storage initialization error: {0}")]
    StorageError(#[from] StorageError),
}

/// Error types for visitor log storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error on the log or its CSV mirror.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// CSV mirror write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A blocking storage task panicked or was cancelled.
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(e: tokio::task::JoinError) -> Self {
        StorageError::Task(e.to_string())
    }
}
