//! Identity reconciliation: turns one request (plus an optional collection
//! body) into a [`VisitorRecord`].
//!
//! Steps, in order: client IP, locality, user-agent reconciliation, geo,
//! client signals, heuristics. Every step degrades to a sentinel instead of
//! failing, so resolution itself is infallible.

pub mod cascade;
mod client_ip;
mod locality;
mod payload;
mod session;

pub use client_ip::{normalize_ip_candidate, resolve_client_ip, IpCandidates, ResolvedIp};
pub use locality::is_local_ip;
pub use payload::{cap_client_data, ClientPayload};
pub use session::{generate_session_id, session_from_cookie};

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use serde_json::Value;

use crate::config::{
    CLIENT_HINT_HEADERS, DEFAULT_VPN_PREFIXES, HEADER_USER_AGENT, MAX_CLIENT_DATA_BYTES,
    MAX_USER_AGENT_LENGTH,
};
use crate::fingerprint;
use crate::geoip::{resolve_geo, GeoLookup};
use crate::heuristics::{detect_incognito, detect_multi_monitor, detect_proxy, detect_vpn};
use crate::models::{
    ClientHeuristics, CollectionSource, NetworkInfo, ProxyVpnHeuristic, VisitorRecord,
};
use crate::user_agent;
use crate::utils::sanitize::{sanitize_header_value, strip_control_chars, truncate_chars};

/// What the HTTP layer knows about a request.
#[derive(Debug, Clone, Copy)]
pub struct RequestSignals<'a> {
    pub headers: &'a HeaderMap,
    /// Raw socket peer
    pub peer: Option<SocketAddr>,
    /// Address the embedding framework already resolved, if any. The axum
    /// server resolves none, so `IpSource::Framework` only comes from library callers.
    pub framework_ip: Option<IpAddr>,
}

/// Builds visitor records. Cheap to clone; shared across handlers.
#[derive(Clone)]
pub struct Resolver {
    geo: Arc<dyn GeoLookup>,
    vpn_prefixes: Vec<String>,
    client_data_cap: usize,
}

impl Resolver {
    /// Resolver with the built-in VPN prefix table and default clientData cap.
    pub fn new(geo: Arc<dyn GeoLookup>) -> Self {
        Self {
            geo,
            vpn_prefixes: DEFAULT_VPN_PREFIXES.iter().map(|p| p.to_string()).collect(),
            client_data_cap: MAX_CLIENT_DATA_BYTES,
        }
    }

    /// Adds prefixes to the VPN table.
    pub fn with_vpn_prefixes(mut self, extra: Vec<String>) -> Self {
        for prefix in extra {
            let prefix = prefix.trim().to_string();
            if !prefix.is_empty() && !self.vpn_prefixes.contains(&prefix) {
                self.vpn_prefixes.push(prefix);
            }
        }
        self
    }

    pub fn with_client_data_cap(mut self, cap: usize) -> Self {
        self.client_data_cap = cap;
        self
    }

    pub fn vpn_prefixes(&self) -> &[String] {
        &self.vpn_prefixes
    }

    /// Client IP only, without building a record.
    pub fn resolve_ip(&self, signals: &RequestSignals<'_>) -> ResolvedIp {
        resolve_client_ip(&IpCandidates::from_request(
            signals.headers,
            signals.framework_ip,
            signals.peer,
        ))
    }

    /// Builds the full record for one visit.
    pub fn resolve(
        &self,
        signals: &RequestSignals<'_>,
        body: Option<&Value>,
        source: CollectionSource,
        session_id: String,
    ) -> VisitorRecord {
        let headers = signals.headers;

        let candidates =
            IpCandidates::from_request(headers, signals.framework_ip, signals.peer);
        let ResolvedIp { ip, source: ip_source } = resolve_client_ip(&candidates);
        let is_localhost = is_local_ip(&ip);

        let user_agent = headers
            .get(HEADER_USER_AGENT)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .map(|raw| truncate_chars(strip_control_chars(&raw).trim(), MAX_USER_AGENT_LENGTH))
            .unwrap_or_default();
        let ua = user_agent::reconcile(&user_agent);

        let geo = resolve_geo(self.geo.as_ref(), &ip, is_localhost);

        let payload = ClientPayload::from_body(body, self.client_data_cap);
        let fingerprint = fingerprint::build_record(
            &payload.fingerprint,
            &payload.screen,
            &payload.locale,
            &user_agent,
        );

        let network = NetworkInfo {
            headers: candidates.audit(),
            isp: geo.as_ref().and_then(|g| g.isp.clone()),
            org: geo.as_ref().and_then(|g| g.org.clone()),
            asn: geo.as_ref().and_then(|g| g.asn.clone()),
            proxy_vpn_heuristic: ProxyVpnHeuristic {
                using_proxy: detect_proxy(headers),
                using_vpn: detect_vpn(&ip, &self.vpn_prefixes),
            },
            ip,
            is_localhost,
            ip_source,
        };

        let heuristics = ClientHeuristics {
            incognito: detect_incognito(&payload.storage),
            multi_monitor: detect_multi_monitor(&payload.screen),
        };

        VisitorRecord {
            timestamp: Utc::now(),
            session_id,
            source,
            user_agent,
            network,
            browser: ua.browser,
            os: ua.os,
            device: ua.device,
            engine: ua.engine,
            cpu: ua.cpu,
            parsers: ua.parsers,
            geo,
            client_hints: client_hints(headers),
            screen: payload.screen,
            locale: payload.locale,
            performance: payload.performance,
            storage: payload.storage,
            fingerprint,
            web_rtc: payload.web_rtc,
            battery: payload.battery,
            media_devices: payload.media_devices,
            heuristics,
            client_data: payload.client_data,
        }
    }
}

/// Every client-hint header, empty string when absent.
fn client_hints(headers: &HeaderMap) -> BTreeMap<String, String> {
    CLIENT_HINT_HEADERS
        .iter()
        .map(|name| {
            let value = headers
                .get(*name)
                .map(|v| sanitize_header_value(&String::from_utf8_lossy(v.as_bytes())))
                .unwrap_or_default();
            (name.to_string(), value)
        })
        .collect()
}
