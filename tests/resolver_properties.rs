//! Resolver behavior through the public API: IP precedence, locality,
//! geolocation fallbacks and canvas fingerprint stability.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use serde_json::json;

use visitor_log::fingerprint::{canvas_fingerprint, RasterSurface, Surface, CANVAS_HEIGHT, CANVAS_WIDTH};
use visitor_log::geoip::{resolve_geo, GeoDatabase, GeoIpResult, GeoLookup};
use visitor_log::models::{CollectionSource, IpSource};
use visitor_log::resolver::{is_local_ip, resolve_client_ip, IpCandidates};
use visitor_log::user_agent::reconcile;
use visitor_log::{RequestSignals, Resolver};

/// Lookup that knows exactly one address.
struct FakeGeo {
    known: IpAddr,
}

impl GeoLookup for FakeGeo {
    fn lookup(&self, ip: IpAddr) -> Option<GeoIpResult> {
        (ip == self.known).then(|| GeoIpResult {
            country_code: Some("DE".into()),
            country_name: Some("Germany".into()),
            city: Some("Berlin".into()),
            asn: Some(3320),
            asn_org: Some("Deutsche Telekom AG".into()),
            ..Default::default()
        })
    }
}

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(*name, HeaderValue::from_str(value).unwrap());
    }
    map
}

#[test]
fn test_every_source_permutation_picks_highest_priority() {
    let sources: [(&'static str, &str, IpSource); 4] = [
        ("cf-connecting-ip", "9.9.9.9", IpSource::CfConnectingIp),
        ("x-real-ip", "8.8.4.4", IpSource::XRealIp),
        ("x-forwarded-for", "1.1.1.1, 2.2.2.2", IpSource::XForwardedFor),
        ("forwarded", "for=198.51.100.23;proto=https", IpSource::Forwarded),
    ];
    let expected_ip = ["9.9.9.9", "8.8.4.4", "1.1.1.1", "198.51.100.23"];
    let peer: SocketAddr = "192.0.2.10:40000".parse().unwrap();

    // every non-empty subset of header sources, plus a socket peer
    for mask in 1u8..16 {
        let present: Vec<usize> = (0..4).filter(|i| mask & (1 << i) != 0).collect();
        let map = headers(
            &present
                .iter()
                .map(|&i| (sources[i].0, sources[i].1))
                .collect::<Vec<_>>(),
        );
        let resolved = resolve_client_ip(&IpCandidates::from_request(&map, None, Some(peer)));

        let winner = present[0];
        assert_eq!(resolved.ip, expected_ip[winner], "mask {:04b}", mask);
        assert_eq!(resolved.source, sources[winner].2, "mask {:04b}", mask);
    }
}

#[test]
fn test_loopback_headers_fall_through_to_peer() {
    let map = headers(&[("cf-connecting-ip", "127.0.0.1"), ("x-forwarded-for", "::1")]);
    let peer: SocketAddr = "192.0.2.10:40000".parse().unwrap();
    let resolved = resolve_client_ip(&IpCandidates::from_request(&map, None, Some(peer)));
    assert_eq!(resolved.ip, "192.0.2.10");
    assert_eq!(resolved.source, IpSource::Socket);
}

#[test]
fn test_locality_examples() {
    for ip in ["127.0.0.1", "::1", "192.168.1.50", "10.0.0.5", "172.20.3.4"] {
        assert!(is_local_ip(ip), "{} should be local", ip);
    }
    assert!(!is_local_ip("8.8.8.8"));
}

#[test]
fn test_geo_placeholder_and_public_miss() {
    let db = GeoDatabase::disabled();

    let local = resolve_geo(&db, "192.168.1.50", true).expect("placeholder for local IP");
    assert_eq!(local.country.as_deref(), Some("Localhost"));
    assert_eq!(local.country_code.as_deref(), Some("LO"));

    assert!(resolve_geo(&db, "8.8.8.8", false).is_none());
}

#[test]
fn test_resolver_uses_injected_lookup() {
    let fake = FakeGeo {
        known: "203.0.113.77".parse().unwrap(),
    };
    let resolver = Resolver::new(Arc::new(fake));

    let map = headers(&[("x-real-ip", "203.0.113.77"), ("via", "1.1 edge")]);
    let signals = RequestSignals {
        headers: &map,
        peer: None,
        framework_ip: None,
    };
    let record = resolver.resolve(&signals, None, CollectionSource::PageView, "sess_x".into());

    let geo = record.geo.expect("known IP should resolve");
    assert_eq!(geo.city.as_deref(), Some("Berlin"));
    assert_eq!(record.network.asn.as_deref(), Some("AS3320 Deutsche Telekom AG"));
    assert!(record.network.proxy_vpn_heuristic.using_proxy.flag);
    assert!(!record.network.is_localhost);

    // a different public address misses and stays null
    let map = headers(&[("x-real-ip", "203.0.113.78")]);
    let signals = RequestSignals {
        headers: &map,
        peer: None,
        framework_ip: None,
    };
    let record = resolver.resolve(&signals, None, CollectionSource::PageView, "sess_y".into());
    assert!(record.geo.is_none());
}

#[test]
fn test_body_sections_and_overflowing_client_data() {
    let resolver = Resolver::new(Arc::new(GeoDatabase::disabled())).with_client_data_cap(64);
    let map = HeaderMap::new();
    let signals = RequestSignals {
        headers: &map,
        peer: None,
        framework_ip: None,
    };
    let body = json!({
        "screen": { "width": 1920, "height": 1080 },
        "notes": "x".repeat(200),
    });
    let record = resolver.resolve(&signals, Some(&body), CollectionSource::Collect, "sess_z".into());

    assert_eq!(record.screen.width, Some(1920));
    assert_eq!(record.client_data["truncated"], true);
    assert!(record.client_data["originalBytes"].as_u64().unwrap() > 64);
}

#[test]
fn test_unknown_user_agent_never_null() {
    let ua = reconcile("");
    assert_eq!(ua.browser.name, "Unknown");
    assert_eq!(ua.os.name, "Unknown");
    assert_eq!(ua.engine.name, "Unknown");
    assert_eq!(ua.cpu.architecture, "Unknown");
}

#[test]
fn test_canvas_fingerprint_determinism_and_sensitivity() {
    let render = || {
        let mut surface = RasterSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        canvas_fingerprint(&mut surface).unwrap()
    };
    assert_eq!(render(), render());

    let mut altered = RasterSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    altered.set_fill_style("#123456");
    altered.fill_rect(0, 0, 1, 1);
    let altered_hash = canvas_fingerprint(&mut altered).unwrap();
    assert_ne!(altered_hash, render());
}
