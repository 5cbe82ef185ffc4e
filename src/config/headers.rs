//! HTTP header name constants.
//!
//! Header names are lowercase because `http::HeaderMap` lookups are
//! case-insensitive and lowercase is the canonical wire form for HTTP/2.

// Client IP candidate headers, highest priority first
/// Cloudflare connecting-IP header
pub const HEADER_CF_CONNECTING_IP: &str = "cf-connecting-ip";
/// Explicit real-IP header set by nginx-style reverse proxies
pub const HEADER_X_REAL_IP: &str = "x-real-ip";
/// Forwarded-for chain (client first)
pub const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";
/// RFC 7239 Forwarded header
pub const HEADER_FORWARDED: &str = "forwarded";

// Proxy/CDN indicators
/// Via header (proxy chain information)
pub const HEADER_VIA: &str = "via";
/// Custom proxy identification header
pub const HEADER_X_PROXY_ID: &str = "x-proxy-id";
/// Forwarded protocol header (set by TLS-terminating proxies)
pub const HEADER_X_FORWARDED_PROTO: &str = "x-forwarded-proto";
/// CF-Ray header (Cloudflare request ID)
pub const HEADER_CF_RAY: &str = "cf-ray";
/// CloudFront request ID
pub const HEADER_X_AMZ_CF_ID: &str = "x-amz-cf-id";
/// X-Served-By header (Fastly server identification)
pub const HEADER_X_SERVED_BY: &str = "x-served-by";
/// Fastly client IP header
pub const HEADER_FASTLY_CLIENT_IP: &str = "fastly-client-ip";
/// Akamai origin hop counter
pub const HEADER_AKAMAI_ORIGIN_HOP: &str = "akamai-origin-hop";

/// Headers whose presence marks the request as having passed through a proxy or CDN edge.
///
/// To add/remove indicators, modify this array.
pub const PROXY_HEADERS: &[&str] = &[
    HEADER_VIA,
    HEADER_X_PROXY_ID,
    HEADER_X_FORWARDED_PROTO,
    // CDN edges
    HEADER_CF_RAY,
    HEADER_X_AMZ_CF_ID,
    HEADER_X_SERVED_BY,
    HEADER_FASTLY_CLIENT_IP,
    HEADER_AKAMAI_ORIGIN_HOP,
];

// Request metadata
/// User-Agent header
pub const HEADER_USER_AGENT: &str = "user-agent";
/// Cookie header
pub const HEADER_COOKIE: &str = "cookie";

/// Client-hint style headers copied into every record (empty string when absent).
pub const CLIENT_HINT_HEADERS: &[&str] = &[
    "screen-width",
    "screen-height",
    "color-depth",
    "pixel-ratio",
    "device-memory",
    "hardware-concurrency",
    "downlink",
    "effective-type",
    "rtt",
    "save-data",
    "viewport-width",
    "viewport-height",
];

/// Known hosting/VPN network prefixes (dotted-decimal).
///
/// Placeholder data: a small sample of hosting ranges, not a maintained list.
/// Operators extend it with `--vpn-prefix`.
pub const DEFAULT_VPN_PREFIXES: &[&str] = &[
    "45.32.", "45.63.", "45.76.", "45.77.", "104.238.", "108.61.", "149.28.", "207.148.",
    "185.220.", "89.187.",
];
