//! Local/private address classification.

/// Literals treated as loopback.
const LOOPBACK_LITERALS: &[&str] = &["127.0.0.1", "::1", "localhost", "::ffff:127.0.0.1"];

/// Dotted prefixes of the three RFC 1918 blocks.
const PRIVATE_PREFIXES: &[&str] = &[
    "10.", "172.16.", "172.17.", "172.18.", "172.19.", "172.20.", "172.21.", "172.22.",
    "172.23.", "172.24.", "172.25.", "172.26.", "172.27.", "172.28.", "172.29.", "172.30.",
    "172.31.", "192.168.",
];

/// Returns `true` for loopback literals, RFC 1918 addresses, and empty input.
///
/// Empty input counts as local so that ambiguous local-development requests
/// land in the localhost bucket instead of being attributed to a real location.
pub fn is_local_ip(ip: &str) -> bool {
    let ip = ip.trim();
    if ip.is_empty() {
        return true;
    }
    LOOPBACK_LITERALS.contains(&ip) || PRIVATE_PREFIXES.iter().any(|p| ip.starts_with(p))
}
