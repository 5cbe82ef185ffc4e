//! Client IP resolution through proxy-header precedence.
//!
//! Candidate sources are examined in a fixed order and the first one that
//! normalizes to a non-loopback address wins:
//!
//! 1. `CF-Connecting-IP`
//! 2. `X-Real-IP`
//! 3. `X-Forwarded-For` (first entry of the chain)
//! 4. `Forwarded` (RFC 7239 `for=` parameter)
//! 5. the IP the embedding framework resolved, if it supplied one
//! 6. the raw socket peer address
//!
//! When nothing qualifies the loopback address is returned. Resolution never fails.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

use crate::config::{
    HEADER_CF_CONNECTING_IP, HEADER_FORWARDED, HEADER_X_FORWARDED_FOR, HEADER_X_REAL_IP,
    LOOPBACK_FALLBACK_IP,
};
use crate::models::{IpHeaderAudit, IpSource};
use crate::utils::sanitize::sanitize_header_value;

/// Raw values of every client IP source for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpCandidates {
    pub cf_connecting_ip: Option<String>,
    pub x_real_ip: Option<String>,
    pub x_forwarded_for: Option<String>,
    pub forwarded: Option<String>,
    pub framework_ip: Option<String>,
    pub socket_addr: Option<String>,
}

/// The winning address and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIp {
    pub ip: String,
    pub source: IpSource,
}

impl IpCandidates {
    /// Collects candidates from request headers and connection metadata.
    ///
    /// Repeated headers are joined with `", "` so a chain split across several
    /// `X-Forwarded-For` lines still reads client-first.
    pub fn from_request(
        headers: &HeaderMap,
        framework_ip: Option<IpAddr>,
        peer: Option<SocketAddr>,
    ) -> Self {
        Self {
            cf_connecting_ip: header_joined(headers, HEADER_CF_CONNECTING_IP),
            x_real_ip: header_joined(headers, HEADER_X_REAL_IP),
            x_forwarded_for: header_joined(headers, HEADER_X_FORWARDED_FOR),
            forwarded: header_joined(headers, HEADER_FORWARDED),
            framework_ip: framework_ip.map(|ip| ip.to_string()),
            socket_addr: peer.map(|addr| addr.to_string()),
        }
    }

    /// Sources in priority order.
    fn ordered(&self) -> [(IpSource, Option<&str>); 6] {
        [
            (IpSource::CfConnectingIp, self.cf_connecting_ip.as_deref()),
            (IpSource::XRealIp, self.x_real_ip.as_deref()),
            (IpSource::XForwardedFor, self.x_forwarded_for.as_deref()),
            (IpSource::Forwarded, self.forwarded.as_deref()),
            (IpSource::Framework, self.framework_ip.as_deref()),
            (IpSource::Socket, self.socket_addr.as_deref()),
        ]
    }

    /// Sanitized copy of every raw value for the record's audit section.
    pub fn audit(&self) -> IpHeaderAudit {
        let clean = |v: &Option<String>| v.as_deref().map(sanitize_header_value);
        IpHeaderAudit {
            cf_connecting_ip: clean(&self.cf_connecting_ip),
            x_real_ip: clean(&self.x_real_ip),
            x_forwarded_for: clean(&self.x_forwarded_for),
            forwarded: clean(&self.forwarded),
            framework_ip: clean(&self.framework_ip),
            remote_address: clean(&self.socket_addr),
        }
    }
}

fn header_joined(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<String> = headers
        .get_all(name)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Returns the address a human would read off the highest-priority usable source.
pub fn resolve_client_ip(candidates: &IpCandidates) -> ResolvedIp {
    for (source, raw) in candidates.ordered() {
        let Some(raw) = raw else { continue };
        match normalize_ip_candidate(raw) {
            Some(ip) if !is_loopback(&ip) => return ResolvedIp { ip, source },
            Some(_) => log::trace!("Skipping loopback {} value", source),
            None => {
                if !raw.trim().is_empty() {
                    log::debug!("Ignoring unparsable {} value: {:?}", source, raw);
                }
            }
        }
    }

    ResolvedIp {
        ip: LOOPBACK_FALLBACK_IP.to_string(),
        source: IpSource::Fallback,
    }
}

/// Normalizes one raw source value into a canonical IP string.
///
/// - trims whitespace
/// - keeps the first entry of a comma-separated chain
/// - extracts the address after `for=` from RFC 7239 parameter lists
/// - strips quotes, IPv6 brackets and ports
/// - unwraps IPv4-mapped IPv6 (`::ffff:a.b.c.d`)
///
/// Returns `None` when what remains is not an IP address.
pub fn normalize_ip_candidate(raw: &str) -> Option<String> {
    let first = raw.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }

    let value = extract_forwarded_for(first).unwrap_or(first);
    let value = value.trim().trim_matches('"');
    let host = strip_port(value);

    match host.parse::<IpAddr>().ok()? {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => Some(v4.to_string()),
            None => Some(v6.to_string()),
        },
        ip => Some(ip.to_string()),
    }
}

/// Value of the `for` parameter in a `Forwarded` element such as
/// `for=198.51.100.23;proto=https`.
fn extract_forwarded_for(element: &str) -> Option<&str> {
    element.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim().eq_ignore_ascii_case("for").then(|| value.trim())
    })
}

/// Strips `[v6]:port`, `[v6]` and `v4:port` down to the bare address.
fn strip_port(value: &str) -> &str {
    if let Some(rest) = value.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match value.matches(':').count() {
        1 => value.split(':').next().unwrap_or(value),
        _ => value,
    }
}

fn is_loopback(ip: &str) -> bool {
    ip.parse::<IpAddr>().map(|a| a.is_loopback()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn candidates() -> IpCandidates {
        IpCandidates::default()
    }

    #[test]
    fn test_connecting_ip_beats_forwarded_for() {
        let c = IpCandidates {
            cf_connecting_ip: Some("9.9.9.9".into()),
            x_forwarded_for: Some("1.1.1.1, 2.2.2.2".into()),
            ..candidates()
        };
        let resolved = resolve_client_ip(&c);
        assert_eq!(resolved.ip, "9.9.9.9");
        assert_eq!(resolved.source, IpSource::CfConnectingIp);
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let c = IpCandidates {
            x_forwarded_for: Some("203.0.113.5, 70.41.3.18".into()),
            ..candidates()
        };
        assert_eq!(resolve_client_ip(&c).ip, "203.0.113.5");
    }

    #[test]
    fn test_rfc7239_forwarded_only_source() {
        let c = IpCandidates {
            forwarded: Some("for=198.51.100.23;proto=https".into()),
            ..candidates()
        };
        let resolved = resolve_client_ip(&c);
        assert_eq!(resolved.ip, "198.51.100.23");
        assert_eq!(resolved.source, IpSource::Forwarded);
    }

    #[test]
    fn test_rfc7239_quoted_ipv6_with_port() {
        assert_eq!(
            normalize_ip_candidate("For=\"[2001:db8:cafe::17]:4711\""),
            Some("2001:db8:cafe::17".to_string())
        );
    }

    #[test]
    fn test_real_ip_beats_forwarded_for() {
        let c = IpCandidates {
            x_real_ip: Some("198.51.100.7".into()),
            x_forwarded_for: Some("203.0.113.5".into()),
            ..candidates()
        };
        assert_eq!(resolve_client_ip(&c).source, IpSource::XRealIp);
    }

    #[test]
    fn test_loopback_sources_are_skipped() {
        let c = IpCandidates {
            cf_connecting_ip: Some("127.0.0.1".into()),
            x_real_ip: Some("::1".into()),
            socket_addr: Some("203.0.113.9:51234".into()),
            ..candidates()
        };
        let resolved = resolve_client_ip(&c);
        assert_eq!(resolved.ip, "203.0.113.9");
        assert_eq!(resolved.source, IpSource::Socket);
    }

    #[test]
    fn test_malformed_forwarded_for_continues_search() {
        let c = IpCandidates {
            x_forwarded_for: Some("<script>, 10.0.0.1".into()),
            framework_ip: Some("192.0.2.44".into()),
            ..candidates()
        };
        let resolved = resolve_client_ip(&c);
        assert_eq!(resolved.ip, "192.0.2.44");
        assert_eq!(resolved.source, IpSource::Framework);
    }

    #[test]
    fn test_fallback_to_loopback() {
        let resolved = resolve_client_ip(&candidates());
        assert_eq!(resolved.ip, "127.0.0.1");
        assert_eq!(resolved.source, IpSource::Fallback);

        let only_loopback = IpCandidates {
            socket_addr: Some("127.0.0.1:4000".into()),
            ..candidates()
        };
        assert_eq!(resolve_client_ip(&only_loopback).source, IpSource::Fallback);
    }

    #[test]
    fn test_ipv4_mapped_prefix_stripped() {
        assert_eq!(
            normalize_ip_candidate("::ffff:203.0.113.8"),
            Some("203.0.113.8".to_string())
        );
        // Mapped loopback is still loopback.
        let c = IpCandidates {
            x_real_ip: Some("::ffff:127.0.0.1".into()),
            ..candidates()
        };
        assert_eq!(resolve_client_ip(&c).source, IpSource::Fallback);
    }

    #[test]
    fn test_normalize_handles_whitespace_and_ports() {
        assert_eq!(
            normalize_ip_candidate("  203.0.113.5:8080  "),
            Some("203.0.113.5".to_string())
        );
        assert_eq!(
            normalize_ip_candidate("[2001:db8::1]:443"),
            Some("2001:db8::1".to_string())
        );
        assert_eq!(normalize_ip_candidate("2001:db8::1"), Some("2001:db8::1".to_string()));
        assert_eq!(normalize_ip_candidate(""), None);
        assert_eq!(normalize_ip_candidate(" , "), None);
        assert_eq!(normalize_ip_candidate("for=unknown"), None);
    }

    #[test]
    fn test_from_request_joins_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("x-forwarded-for", HeaderValue::from_static("203.0.113.5"));
        headers.append("x-forwarded-for", HeaderValue::from_static("70.41.3.18"));
        let peer: SocketAddr = "10.1.2.3:5555".parse().unwrap();

        let c = IpCandidates::from_request(&headers, None, Some(peer));
        assert_eq!(c.x_forwarded_for.as_deref(), Some("203.0.113.5, 70.41.3.18"));
        assert_eq!(c.socket_addr.as_deref(), Some("10.1.2.3:5555"));
        assert_eq!(resolve_client_ip(&c).ip, "203.0.113.5");
    }

    #[test]
    fn test_audit_sanitizes_values() {
        let c = IpCandidates {
            x_forwarded_for: Some("203.0.113.5\r\n".into()),
            ..candidates()
        };
        let audit = c.audit();
        assert_eq!(audit.x_forwarded_for.as_deref(), Some("203.0.113.5"));
        assert!(audit.cf_connecting_ip.is_none());
    }
}
