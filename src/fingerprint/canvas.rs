//! Server-side canvas fingerprinting.
//!
//! [`Surface`] is the subset of a 2D canvas API the fingerprint script uses.
//! [`RasterSurface`] implements it on an RGBA bitmap with a fixed block font,
//! so the output only depends on the drawing calls.

use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, ImageResult, Rgba, RgbaImage};

use super::hash::rolling_hash;

/// Canvas size used by the fingerprint script.
pub const CANVAS_WIDTH: u32 = 200;
/// Canvas size used by the fingerprint script.
pub const CANVAS_HEIGHT: u32 = 50;

/// Text drawn by the fingerprint script.
pub const CANVAS_TEXT: &str = "Hello, World! \u{1F3A8}";

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: i32 = 6;

/// Minimal 2D drawing surface.
pub trait Surface {
    /// Sets the fill color from a CSS color string. Unparseable colors are
    /// ignored, as a browser canvas does.
    fn set_fill_style(&mut self, color: &str);
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32);
    /// Draws `text` with its baseline at `y`.
    fn fill_text(&mut self, text: &str, x: i32, y: i32);
    /// PNG-encoded contents as a `data:` URL.
    fn to_data_url(&self) -> ImageResult<String>;
}

/// [`Surface`] backed by an in-memory RGBA image.
pub struct RasterSurface {
    image: RgbaImage,
    fill: Rgba<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            fill: Rgba([0, 0, 0, 255]),
        }
    }

    /// Alpha-blends the current fill color onto one pixel; out of bounds is a no-op.
    fn blend(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= i64::from(self.image.width()) || y >= i64::from(self.image.height()) {
            return;
        }
        let src = self.fill;
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let a = u32::from(src[3]);
        let inv = 255 - a;
        for c in 0..3 {
            dst[c] = ((u32::from(src[c]) * a + u32::from(dst[c]) * inv) / 255) as u8;
        }
        dst[3] = (a + u32::from(dst[3]) * inv / 255) as u8;
    }
}

impl Surface for RasterSurface {
    fn set_fill_style(&mut self, color: &str) {
        if let Some(parsed) = parse_color(color) {
            self.fill = parsed;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        for dy in 0..i64::from(height) {
            for dx in 0..i64::from(width) {
                self.blend(i64::from(x) + dx, i64::from(y) + dy);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32) {
        let top = i64::from(y) - i64::from(GLYPH_HEIGHT);
        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let bits = glyph_bits(ch);
            let left = i64::from(x) + i as i64 * i64::from(GLYPH_ADVANCE);
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (row * GLYPH_WIDTH + col)) & 1 == 1 {
                        self.blend(left + i64::from(col), top + i64::from(row));
                    }
                }
            }
        }
    }

    fn to_data_url(&self) -> ImageResult<String> {
        let mut png_bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png_bytes)
        ))
    }
}

/// 5x7 glyph bitmap derived from the code point. Not legible, but stable and
/// distinct per character.
fn glyph_bits(ch: char) -> u64 {
    let mut x = u64::from(u32::from(ch)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 29;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 32;
    x & ((1u64 << (GLYPH_WIDTH * GLYPH_HEIGHT)) - 1)
}

/// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
pub fn parse_color(color: &str) -> Option<Rgba<u8>> {
    let color = color.trim();

    if let Some(hex) = color.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some(Rgba([r * 17, g * 17, b * 17, 255])),
            [r1, r2, g1, g2, b1, b2] => Some(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
            _ => None,
        };
    }

    let inner = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    fn channel(s: &str) -> Option<u8> {
        s.parse().ok()
    }
    match parts.as_slice() {
        [r, g, b] => Some(Rgba([channel(r)?, channel(g)?, channel(b)?, 255])),
        [r, g, b, a] => {
            let alpha = a.parse::<f64>().ok()?.clamp(0.0, 1.0);
            Some(Rgba([
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha * 255.0).round() as u8,
            ]))
        }
        _ => None,
    }
}

/// Runs the fixed fingerprint drawing script on `surface` and hashes the
/// resulting data URL.
pub fn canvas_fingerprint<S: Surface + ?Sized>(surface: &mut S) -> ImageResult<i32> {
    surface.set_fill_style("#f60");
    surface.fill_rect(125, 1, 62, 20);
    surface.set_fill_style("#069");
    surface.fill_text(CANVAS_TEXT, 2, 15);
    surface.set_fill_style("rgba(102, 204, 0, 0.7)");
    surface.fill_text(CANVAS_TEXT, 4, 17);

    let data_url = surface.to_data_url()?;
    Ok(rolling_hash(&data_url))
}

/// Fingerprint of a fresh [`RasterSurface`]: the server's own reference value.
pub fn reference_canvas_hash() -> ImageResult<i32> {
    canvas_fingerprint(&mut RasterSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT))
}
