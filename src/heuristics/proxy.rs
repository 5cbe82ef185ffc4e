//! Proxy and VPN indicators derived from the request itself.

use axum::http::HeaderMap;

use crate::config::PROXY_HEADERS;
use crate::models::Detection;

/// Flags the request when any proxy/CDN indicator header is present.
///
/// One reason per header found, in [`PROXY_HEADERS`] order.
pub fn detect_proxy(headers: &HeaderMap) -> Detection {
    let reasons = PROXY_HEADERS
        .iter()
        .filter(|name| headers.contains_key(**name))
        .map(|name| format!("{} header present", name))
        .collect();
    Detection::from_reasons(reasons)
}

/// Flags addresses that fall inside a known hosting/VPN prefix.
///
/// Prefixes are dotted-decimal strings (`"45.32."`) matched against the
/// textual address, so IPv6 addresses never match.
pub fn detect_vpn<S: AsRef<str>>(ip: &str, prefixes: &[S]) -> Detection {
    let reasons = prefixes
        .iter()
        .map(AsRef::as_ref)
        .filter(|prefix| !prefix.is_empty() && ip.starts_with(prefix))
        .map(|prefix| format!("IP {} matches hosting/VPN range {}", ip, prefix))
        .take(1)
        .collect();
    Detection::from_reasons(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VPN_PREFIXES;
    use axum::http::HeaderValue;

    #[test]
    fn test_no_proxy_headers() {
        let detection = detect_proxy(&HeaderMap::new());
        assert!(!detection.flag);
        assert!(detection.reasons.is_empty());
    }

    #[test]
    fn test_one_reason_per_proxy_header() {
        let mut headers = HeaderMap::new();
        headers.insert("via", HeaderValue::from_static("1.1 squid"));
        headers.insert("cf-ray", HeaderValue::from_static("8a1b2c3d4e5f-AMS"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.4.0"));

        let detection = detect_proxy(&headers);
        assert!(detection.flag);
        assert_eq!(
            detection.reasons,
            vec!["via header present", "cf-ray header present"]
        );
    }

    #[test]
    fn test_vpn_prefix_match() {
        let detection = detect_vpn("45.32.10.1", DEFAULT_VPN_PREFIXES);
        assert!(detection.flag);
        assert_eq!(detection.reasons.len(), 1);

        assert!(!detect_vpn("8.8.8.8", DEFAULT_VPN_PREFIXES).flag);
        // prefix match is on dotted boundaries
        assert!(!detect_vpn("145.32.10.1", DEFAULT_VPN_PREFIXES).flag);
    }

    #[test]
    fn test_vpn_ignores_empty_prefixes() {
        assert!(!detect_vpn("1.2.3.4", &["".to_string()]).flag);
    }
}
