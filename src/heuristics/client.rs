//! Heuristics over client-reported signals. Both are approximate: a large
//! private-window quota or a single wide monitor will fool them.

use crate::config::INCOGNITO_QUOTA_THRESHOLD_BYTES;
use crate::models::{Detection, ScreenInfo, StorageInfo};

/// Private windows cap storage quota well below normal profiles and often
/// refuse service-worker registration.
pub fn detect_incognito(storage: &StorageInfo) -> Detection {
    let mut reasons = Vec::new();

    if let Some(quota) = storage.quota_bytes {
        if quota < INCOGNITO_QUOTA_THRESHOLD_BYTES {
            reasons.push(format!(
                "storage quota {} MiB below {} MiB",
                quota / (1024 * 1024),
                INCOGNITO_QUOTA_THRESHOLD_BYTES / (1024 * 1024)
            ));
        }
    }
    if storage.service_worker_ok == Some(false) {
        reasons.push("service worker registration failed".to_string());
    }

    Detection::from_reasons(reasons)
}

/// Extended displays are reported directly by newer browsers; otherwise a
/// window positioned outside the primary screen implies a second one.
pub fn detect_multi_monitor(screen: &ScreenInfo) -> Detection {
    let mut reasons = Vec::new();

    if screen.is_extended == Some(true) {
        reasons.push("screen.isExtended reported".to_string());
    }
    if let Some(x) = screen.window_x {
        if x < 0 {
            reasons.push(format!("window x-offset {} is left of the primary screen", x));
        } else if let Some(width) = screen.width {
            if x >= i64::from(width) {
                reasons.push(format!(
                    "window x-offset {} is beyond screen width {}",
                    x, width
                ));
            }
        }
    }

    Detection::from_reasons(reasons)
}
