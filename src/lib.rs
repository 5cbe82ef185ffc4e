//! visitor_log library: maintenance-page visitor logging
//!
//! This library turns each visit to a maintenance page into one normalized
//! visitor record: client IP resolved through proxy headers, a reconciled
//! user-agent breakdown, GeoIP enrichment, client-reported device signals and
//! proxy/VPN/incognito heuristics. Records are appended to a JSON Lines log
//! (or SQLite) and exposed over a small HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use visitor_log::{start_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     port: 8080,
//!     ..Default::default()
//! };
//! start_server(&config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod error_handling;
pub mod fingerprint;
pub mod geoip;
pub mod heuristics;
pub mod initialization;
pub mod models;
pub mod resolver;
pub mod server;
pub mod storage;
pub mod user_agent;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, StorageBackend};
pub use error_handling::{InitializationError, StorageError};
pub use models::VisitorRecord;
pub use resolver::{RequestSignals, Resolver};
pub use server::{router, serve, start_server, AppState};
pub use storage::{JsonlStore, SqliteStore, VisitorField, VisitorStore};
