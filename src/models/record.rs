//! The persisted visitor record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter};

use super::client::{
    BatteryInfo, FingerprintRecord, LocaleInfo, MediaDevicesInfo, PerformanceInfo, ScreenInfo,
    StorageInfo, WebRtcInfo,
};
use crate::geoip::GeoRecord;
use crate::user_agent::{BrowserInfo, CpuInfo, DeviceInfo, EngineInfo, OsInfo, ParserOutputs};

/// What produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CollectionSource {
    /// `GET /` (request headers only)
    PageView,
    /// `POST /api/collect`
    Collect,
    /// Best-effort unload beacon
    Beacon,
}

/// A heuristic verdict together with the evidence that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub flag: bool,
    pub reasons: Vec<String>,
}

impl Detection {
    /// Builds a detection that fires iff at least one reason was collected.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            flag: !reasons.is_empty(),
            reasons,
        }
    }
}

/// Which candidate source supplied the client IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum IpSource {
    CfConnectingIp,
    XRealIp,
    XForwardedFor,
    Forwarded,
    Framework,
    Socket,
    /// No source produced a usable address; loopback was recorded.
    Fallback,
}

/// Raw value of every client-IP candidate, kept for auditing proxy setups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpHeaderAudit {
    pub cf_connecting_ip: Option<String>,
    pub x_real_ip: Option<String>,
    pub x_forwarded_for: Option<String>,
    pub forwarded: Option<String>,
    pub framework_ip: Option<String>,
    pub remote_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyVpnHeuristic {
    pub using_proxy: Detection,
    #[serde(rename = "usingVPN")]
    pub using_vpn: Detection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub ip: String,
    pub is_localhost: bool,
    pub ip_source: IpSource,
    #[serde(default)]
    pub headers: IpHeaderAudit,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default, rename = "as")]
    pub asn: Option<String>,
    #[serde(default)]
    pub proxy_vpn_heuristic: ProxyVpnHeuristic,
}

/// Heuristics evaluated over client-reported signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientHeuristics {
    pub incognito: Detection,
    pub multi_monitor: Detection,
}

/// One persisted visit.
///
/// Built once by [`crate::resolver::Resolver::resolve`] and never modified
/// afterwards. Optional sections are always serialized (as `null` or empty)
/// so every record has the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub source: CollectionSource,
    #[serde(default)]
    pub user_agent: String,
    pub network: NetworkInfo,
    #[serde(default)]
    pub browser: BrowserInfo,
    #[serde(default)]
    pub os: OsInfo,
    #[serde(default)]
    pub device: DeviceInfo,
    #[serde(default)]
    pub engine: EngineInfo,
    #[serde(default)]
    pub cpu: CpuInfo,
    #[serde(default)]
    pub parsers: ParserOutputs,
    #[serde(default)]
    pub geo: Option<GeoRecord>,
    #[serde(default)]
    pub client_hints: BTreeMap<String, String>,
    #[serde(default)]
    pub screen: ScreenInfo,
    #[serde(default)]
    pub locale: LocaleInfo,
    #[serde(default)]
    pub performance: PerformanceInfo,
    #[serde(default)]
    pub storage: StorageInfo,
    #[serde(default)]
    pub fingerprint: FingerprintRecord,
    #[serde(default, rename = "webRTC")]
    pub web_rtc: WebRtcInfo,
    #[serde(default)]
    pub battery: BatteryInfo,
    #[serde(default)]
    pub media_devices: MediaDevicesInfo,
    #[serde(default)]
    pub heuristics: ClientHeuristics,
    #[serde(default)]
    pub client_data: Value,
}

impl VisitorRecord {
    /// Country used for aggregation: geo country, else `Unknown`.
    pub fn country(&self) -> &str {
        self.geo
            .as_ref()
            .and_then(|g| g.country.as_deref())
            .unwrap_or(crate::config::UNKNOWN)
    }
}
