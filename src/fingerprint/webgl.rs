//! Effective WebGL vendor/renderer.

use crate::models::WebGlInfo;
use crate::resolver::cascade::first_known;

/// Unmasked value when the debug extension reported one, else the masked one,
/// else `Unknown`.
pub fn effective_vendor(webgl: &WebGlInfo) -> String {
    first_known([webgl.unmasked_vendor.as_deref(), webgl.vendor.as_deref()])
}

/// See [`effective_vendor`].
pub fn effective_renderer(webgl: &WebGlInfo) -> String {
    first_known([webgl.unmasked_renderer.as_deref(), webgl.renderer.as_deref()])
}
