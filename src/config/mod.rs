//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (size limits, defaults, heuristic thresholds)
//! - HTTP header name constants consumed by the resolver
//! - CLI option types and parsing

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel, StorageBackend};
