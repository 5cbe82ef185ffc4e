//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use strum_macros::{Display, EnumIter};

use crate::config::constants::{
    DEFAULT_BIND, DEFAULT_DATA_DIR, DEFAULT_PORT, DEFAULT_RECENT_LIMIT, DEFAULT_SESSION_COOKIE,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where visitor records are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Append-only JSON Lines file (one record per line)
    Jsonl,
    /// SQLite database in WAL mode
    Sqlite,
}

/// Server configuration.
///
/// Parsed from the command line (with `VISITOR_LOG_*` environment fallbacks),
/// or constructed programmatically through `Default`.
///
/// # Examples
///
/// ```no_run
/// use visitor_log::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/var/lib/visitor_log"),
///     port: 8080,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "visitor_log", version, about = "Maintenance page visitor logger")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "VISITOR_LOG_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, env = "VISITOR_LOG_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the visitor log and its CSV mirror
    #[arg(long, env = "VISITOR_LOG_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Storage backend for visitor records
    #[arg(long, env = "VISITOR_LOG_STORAGE", value_enum, default_value_t = StorageBackend::Jsonl)]
    pub storage: StorageBackend,

    /// Path to a MaxMind GeoLite2-City database (.mmdb)
    #[arg(long, env = "VISITOR_LOG_GEOIP_CITY")]
    pub geoip_city: Option<PathBuf>,

    /// Path to a MaxMind GeoLite2-ASN database (.mmdb)
    #[arg(long, env = "VISITOR_LOG_GEOIP_ASN")]
    pub geoip_asn: Option<PathBuf>,

    /// Number of records returned by `GET /api/logs` when no limit is given
    #[arg(long, env = "VISITOR_LOG_RECENT_LIMIT", default_value_t = DEFAULT_RECENT_LIMIT)]
    pub recent_limit: usize,

    /// Extra dotted-decimal prefixes treated as hosting/VPN networks (repeatable)
    #[arg(long = "vpn-prefix", env = "VISITOR_LOG_VPN_PREFIXES", value_delimiter = ',')]
    pub vpn_prefixes: Vec<String>,

    /// Name of the session cookie
    #[arg(long, env = "VISITOR_LOG_SESSION_COOKIE", default_value = DEFAULT_SESSION_COOKIE)]
    pub session_cookie: String,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: StorageBackend::Jsonl,
            geoip_city: None,
            geoip_asn: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
            vpn_prefixes: Vec::new(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
