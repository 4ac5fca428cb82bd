//! RGBE → linear conversion, Reinhard tone mapping and exposure.

use super::transfer::{clamp_unit, linear_to_srgb};
use crate::raster::{LinearRaster, RgbeRaster, UnitRaster};

/// Exposure multiplier applied before Reinhard compression when none is
/// configured.
pub const DEFAULT_EXPOSURE: f32 = 1.8;

/// Linear scale for an RGBE exponent byte: `2^(e - 128) / 256`.
#[inline]
pub fn exponent_scale(e: u8) -> f32 {
    2f32.powi(i32::from(e) - 128) / 256.0
}

/// Expand RGBE mantissas with their shared exponent into linear RGB.
///
/// The exponent channel is consumed; nothing is clamped.
pub fn rgbe_to_linear(raster: &RgbeRaster) -> LinearRaster {
    raster.map(|&[r, g, b, e]| {
        let scale = exponent_scale(e);
        [
            f32::from(r) * scale,
            f32::from(g) * scale,
            f32::from(b) * scale,
        ]
    })
}

/// Simple Reinhard operator `x / (1 + x)` for non-negative `x`.
#[inline]
pub fn reinhard(x: f32) -> f32 {
    if x.is_infinite() {
        return 1.0;
    }
    x / (1.0 + x)
}

/// Scale by `exposure`, compress with Reinhard, then sRGB-encode.
///
/// Output is display-ready and lies in `[0, 1]`.
pub fn tone_map(linear: &LinearRaster, exposure: f32) -> UnitRaster {
    linear.map_channels(|x| linear_to_srgb(reinhard(x.max(0.0) * exposure)))
}

/// Shift by `ev` stops (`x * 2^ev`) and clamp into `[0, 1]`.
pub fn apply_exposure(linear: &LinearRaster, ev: f32) -> LinearRaster {
    let scale = ev.exp2();
    linear.map_channels(|x| clamp_unit(x * scale))
}
