//! Proxy, VPN, incognito and multi-monitor heuristics.
//!
//! Pure functions returning a [`crate::models::Detection`]: the flag plus the
//! evidence behind it. None of them are authoritative.

mod client;
mod proxy;

pub use client::{detect_incognito, detect_multi_monitor};
pub use proxy::{detect_proxy, detect_vpn};
