//! Sections of a visitor record that only the browser can report.
//!
//! Every struct deserializes leniently (`#[serde(default)]`): a field the
//! client omitted becomes `None`/empty, and the key is still written back out.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub avail_width: Option<u32>,
    pub avail_height: Option<u32>,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub orientation: Option<String>,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    /// `window.screenX`: negative or past `width` on a secondary display
    pub window_x: Option<i64>,
    /// `window.screen.isExtended` where supported
    pub is_extended: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocaleInfo {
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub timezone: Option<String>,
    pub timezone_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceInfo {
    pub page_load_ms: Option<f64>,
    pub dom_content_loaded_ms: Option<f64>,
    pub js_heap_used_bytes: Option<u64>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory_gb: Option<f64>,
    pub connection_type: Option<String>,
    pub downlink_mbps: Option<f64>,
    pub rtt_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageInfo {
    pub cookies_enabled: Option<bool>,
    pub local_storage: Option<bool>,
    pub session_storage: Option<bool>,
    pub indexed_db: Option<bool>,
    /// `navigator.storage.estimate().quota`
    pub quota_bytes: Option<u64>,
    pub usage_bytes: Option<u64>,
    /// Whether a transient service worker registered and unregistered cleanly
    pub service_worker_ok: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebGlInfo {
    pub vendor: Option<String>,
    pub renderer: Option<String>,
    /// Only present when `WEBGL_debug_renderer_info` is available
    pub unmasked_vendor: Option<String>,
    pub unmasked_renderer: Option<String>,
}

/// Fingerprint signals as posted by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerprintInfo {
    pub canvas_hash: Option<i32>,
    pub webgl: WebGlInfo,
    /// Font families the page found available
    pub fonts: Vec<String>,
    pub touch_points: Option<u32>,
    pub plugins: Vec<String>,
}

/// Fingerprint section as stored: client values plus server-derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerprintRecord {
    pub canvas_hash: Option<i32>,
    pub webgl: WebGlInfo,
    /// Unmasked vendor when reported, else the masked one, else `Unknown`
    pub webgl_vendor: String,
    pub webgl_renderer: String,
    /// Reported fonts that appear in the candidate list, in candidate order
    pub fonts: Vec<String>,
    pub touch_points: Option<u32>,
    pub plugins: Vec<String>,
    /// Rolling hash over the stable signals; a coarse similarity key, not an identifier
    pub device_hash: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebRtcInfo {
    pub supported: Option<bool>,
    /// Candidate addresses gathered before the probe timed out
    pub candidate_ips: Vec<String>,
    pub timed_out: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatteryInfo {
    pub supported: Option<bool>,
    pub level: Option<f64>,
    pub charging: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaDevicesInfo {
    pub supported: Option<bool>,
    pub audio_inputs: Option<u32>,
    pub audio_outputs: Option<u32>,
    pub video_inputs: Option<u32>,
}
