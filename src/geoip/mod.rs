//! GeoIP lookup using MaxMind GeoLite2 databases.
//!
//! Databases are read from local `.mmdb` files once at startup and held in
//! memory. Lookups go through the [`GeoLookup`] trait so callers can swap in a
//! fixed table.

mod lookup;
mod types;

// Re-export public API
pub use lookup::{resolve_geo, GeoDatabase, GeoLookup};
pub use types::{GeoIpMetadata, GeoIpResult, GeoRecord};
