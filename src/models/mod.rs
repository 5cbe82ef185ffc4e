//! Visitor record data model.
//!
//! - `record`: the persisted `VisitorRecord` and its server-side sections
//! - `client`: sections populated only from the client-submitted JSON body

mod client;
mod record;

pub use client::{
    BatteryInfo, FingerprintInfo, FingerprintRecord, LocaleInfo, MediaDevicesInfo,
    PerformanceInfo, ScreenInfo, StorageInfo, WebGlInfo, WebRtcInfo,
};
pub use record::{
    ClientHeuristics, CollectionSource, Detection, IpHeaderAudit, IpSource, NetworkInfo,
    ProxyVpnHeuristic, VisitorRecord,
};
