//! Canvas, WebGL and font fingerprinting.
//!
//! Client-reported fingerprint signals are reduced to a stored
//! [`FingerprintRecord`]: effective WebGL strings, fonts filtered through a
//! [`FontProbe`], and a coarse device hash over the stable signals.

mod canvas;
mod fonts;
mod hash;
mod webgl;

pub use canvas::{
    canvas_fingerprint, parse_color, reference_canvas_hash, RasterSurface, Surface, CANVAS_HEIGHT,
    CANVAS_TEXT, CANVAS_WIDTH,
};
pub use fonts::{detect_fonts, FontProbe, ReportedFonts, DEFAULT_FONT_CANDIDATES};
pub use hash::rolling_hash;
pub use webgl::{effective_renderer, effective_vendor};

use crate::models::{FingerprintInfo, FingerprintRecord, LocaleInfo, ScreenInfo};

/// Builds the stored fingerprint section from the client's report.
///
/// `device_hash` is only computed when the client sent fingerprint data.
pub fn build_record(
    info: &FingerprintInfo,
    screen: &ScreenInfo,
    locale: &LocaleInfo,
    user_agent: &str,
) -> FingerprintRecord {
    let fonts = detect_fonts(&ReportedFonts::new(&info.fonts), DEFAULT_FONT_CANDIDATES);
    let webgl_vendor = effective_vendor(&info.webgl);
    let webgl_renderer = effective_renderer(&info.webgl);

    let reported = *info != FingerprintInfo::default();
    let device_hash = reported.then(|| {
        let components = [
            user_agent.to_string(),
            format!(
                "{}x{}x{}",
                opt(screen.width),
                opt(screen.height),
                opt(screen.color_depth)
            ),
            locale.timezone.clone().unwrap_or_default(),
            locale.language.clone().unwrap_or_default(),
            webgl_vendor.clone(),
            webgl_renderer.clone(),
            fonts.join(","),
            opt(info.canvas_hash),
            opt(info.touch_points),
        ];
        rolling_hash(&components.join("|"))
    });

    FingerprintRecord {
        canvas_hash: info.canvas_hash,
        webgl: info.webgl.clone(),
        webgl_vendor,
        webgl_renderer,
        fonts,
        touch_points: info.touch_points,
        plugins: info.plugins.clone(),
        device_hash,
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
