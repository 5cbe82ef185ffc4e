//! Error handling.
//!
//! This module provides the typed errors returned by the library:
//! - **Initialization errors**: logger, GeoIP and storage setup at startup
//! - **Storage errors**: failures reading or writing the visitor log
//!
//! Enrichment failures (geo misses, unparsable user agents, malformed client
//! payloads) are not errors: they degrade to placeholder values inside the
//! resolver and never surface here.

mod types;

// Re-export public API
pub use types::{InitializationError, StorageError};
