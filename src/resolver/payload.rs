//! Splits a collection body into typed sections and the opaque remainder.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::models::{
    BatteryInfo, FingerprintInfo, LocaleInfo, MediaDevicesInfo, PerformanceInfo, ScreenInfo,
    StorageInfo, WebRtcInfo,
};

/// Client-reported signals from one collection body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPayload {
    pub screen: ScreenInfo,
    pub locale: LocaleInfo,
    pub performance: PerformanceInfo,
    pub storage: StorageInfo,
    pub fingerprint: FingerprintInfo,
    pub web_rtc: WebRtcInfo,
    pub battery: BatteryInfo,
    pub media_devices: MediaDevicesInfo,
    /// Keys not consumed by a section, capped in size
    pub client_data: Value,
}

impl ClientPayload {
    /// Consumes the known sections of `body`; whatever is left becomes
    /// `client_data`. A section that does not fit its shape is dropped and
    /// defaults. `None` yields all defaults and a null `client_data`.
    pub fn from_body(body: Option<&Value>, cap: usize) -> Self {
        let Some(body) = body else {
            return Self::default();
        };
        let Value::Object(map) = body else {
            return Self {
                client_data: cap_client_data(body.clone(), cap),
                ..Default::default()
            };
        };

        let mut rest = map.clone();
        Self {
            screen: take_section(&mut rest, &["screen"]),
            locale: take_section(&mut rest, &["locale"]),
            performance: take_section(&mut rest, &["performance"]),
            storage: take_section(&mut rest, &["storage"]),
            fingerprint: take_section(&mut rest, &["fingerprint"]),
            web_rtc: take_section(&mut rest, &["webRTC", "webrtc", "webRtc"]),
            battery: take_section(&mut rest, &["battery"]),
            media_devices: take_section(&mut rest, &["mediaDevices"]),
            client_data: cap_client_data(Value::Object(rest), cap),
        }
    }
}

/// Removes the first present key of `keys` and decodes it; every alias is
/// removed so none leaks into `client_data`.
fn take_section<T: DeserializeOwned + Default>(map: &mut Map<String, Value>, keys: &[&str]) -> T {
    let mut found = None;
    for key in keys {
        if let Some(value) = map.remove(*key) {
            if found.is_none() {
                found = Some(value);
            }
        }
    }

    match found {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::debug!("Dropping malformed {} section: {}", keys[0], e);
            T::default()
        }),
    }
}

/// Replaces `value` with a truncation marker when its serialization exceeds `cap` bytes.
pub fn cap_client_data(value: Value, cap: usize) -> Value {
    let size = serde_json::to_vec(&value).map(|v| v.len()).unwrap_or(usize::MAX);
    if size > cap {
        log::debug!("clientData of {} bytes exceeds {} byte cap", size, cap);
        json!({ "truncated": true, "originalBytes": size })
    } else {
        value
    }
}
