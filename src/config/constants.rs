//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including size limits, file names and heuristic thresholds.

/// Default HTTP port for the maintenance page server
pub const DEFAULT_PORT: u16 = 3000;
/// Default bind address
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Default directory holding the visitor log and its CSV mirror
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Append-only JSON Lines visitor log file name
pub const JSONL_LOG_FILE: &str = "visitors.jsonl";
/// CSV mirror file name
pub const CSV_LOG_FILE: &str = "visitors.csv";
/// SQLite database file name (used by the `sqlite` storage backend)
pub const SQLITE_DB_FILE: &str = "visitors.db";

/// Number of records returned by `GET /api/logs` when no limit is given
pub const DEFAULT_RECENT_LIMIT: usize = 100;
/// Hard cap on `GET /api/logs?limit=` so one request cannot load the whole log into a response
pub const MAX_RECENT_LIMIT: usize = 10_000;

/// Name of the cookie carrying the visitor session id
pub const DEFAULT_SESSION_COOKIE: &str = "visitor_session";
/// Session cookie lifetime in seconds (one year)
pub const SESSION_COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Address recorded when no candidate source yields a usable client IP
pub const LOOPBACK_FALLBACK_IP: &str = "127.0.0.1";

/// Sentinel written into display fields that no parser could fill
pub const UNKNOWN: &str = "Unknown";

// Size limits
/// Maximum serialized size of the opaque `clientData` pass-through (16 KiB)
/// Larger payloads are replaced by a truncation marker
pub const MAX_CLIENT_DATA_BYTES: usize = 16 * 1024;
/// Maximum request body accepted by the collection endpoints (256 KiB)
pub const MAX_COLLECT_BODY_BYTES: usize = 256 * 1024;
/// Maximum audited header value length in characters
/// Header values longer than this are truncated before they are stored
pub const MAX_HEADER_VALUE_LENGTH: usize = 1000;
/// Maximum user-agent length fed to the parsers
pub const MAX_USER_AGENT_LENGTH: usize = 2048;

// Heuristic thresholds
/// Storage quota below which the incognito heuristic fires (120 MiB)
/// Private browsing windows report a much smaller quota than regular profiles
pub const INCOGNITO_QUOTA_THRESHOLD_BYTES: u64 = 120 * 1024 * 1024;
/// Point size used when probing font availability
pub const FONT_PROBE_SIZE: &str = "72px";
