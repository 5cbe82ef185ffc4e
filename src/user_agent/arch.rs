//! CPU architecture and form-factor flags from raw user-agent substrings.

use crate::resolver::cascade::first_known;

const X64_MARKERS: &[&str] = &["x86_64", "x64", "win64", "wow64", "amd64"];
const X86_MARKERS: &[&str] = &["i386", "i686", "x86", "win32"];
const ARM64_MARKERS: &[&str] = &["arm64", "aarch64"];
const ARM_MARKERS: &[&str] = &["armv7", "armv8l", "armv6", "arm;"];

const BOT_MARKERS: &[&str] = &[
    "bot",
    "crawl",
    "spider",
    "slurp",
    "curl/",
    "wget/",
    "python-requests",
    "headless",
];

/// Architecture cascade: 64-bit x86 markers, then 32-bit, then ARM64, then
/// ARM, then whatever the parsers reported, then `Unknown`.
pub fn architecture(ua: &str, parser_cpu: &[Option<&str>]) -> String {
    let lower = ua.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    let from_markers = if has_any(X64_MARKERS) {
        Some("x86_64")
    } else if has_any(X86_MARKERS) {
        Some("x86")
    } else if has_any(ARM64_MARKERS) {
        Some("ARM64")
    } else if has_any(ARM_MARKERS) {
        Some("ARM")
    } else {
        None
    };

    first_known(
        std::iter::once(from_markers.map(str::to_string)).chain(
            parser_cpu.iter().map(|cpu| cpu.map(str::to_string)),
        ),
    )
}

/// Form-factor flags from case-insensitive substring checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormFactor {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_desktop: bool,
    pub is_bot: bool,
}

impl FormFactor {
    pub fn from_user_agent(ua: &str) -> Self {
        let lower = ua.to_lowercase();
        let has = |needle: &str| lower.contains(needle);

        let is_bot = BOT_MARKERS.iter().any(|m| has(m));
        let is_tablet = has("ipad")
            || has("tablet")
            || has("kindle")
            || has("silk/")
            || (has("android") && !has("mobile"));
        let is_mobile = !is_tablet
            && (has("mobi")
                || has("iphone")
                || has("ipod")
                || has("windows phone")
                || (has("android") && has("mobile")));
        let is_desktop = !lower.trim().is_empty() && !is_mobile && !is_tablet && !is_bot;

        Self {
            is_mobile,
            is_tablet,
            is_desktop,
            is_bot,
        }
    }

    /// Device type implied by the flags alone.
    pub fn device_type(&self) -> Option<&'static str> {
        if self.is_bot {
            Some("bot")
        } else if self.is_tablet {
            Some("tablet")
        } else if self.is_mobile {
            Some("mobile")
        } else if self.is_desktop {
            Some("desktop")
        } else {
            None
        }
    }
}
