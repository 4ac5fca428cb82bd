//! sRGB transfer function (IEC 61966-2-1), scalar and raster forms.

use crate::raster::{DisplayRaster, LinearRaster, Raster, UnitRaster};

/// Linear values at or below this encode on the linear segment.
pub const LINEAR_CUTOFF: f32 = 0.003_130_8;
/// Encoded values at or below this decode on the linear segment.
pub const ENCODED_CUTOFF: f32 = 0.040_45;

/// Encode one linear value. Input is clamped to `[0, 1]` first.
#[inline]
pub fn linear_to_srgb(x: f32) -> f32 {
    let x = clamp_unit(x);
    let encoded = if x <= LINEAR_CUTOFF {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    };
    clamp_unit(encoded)
}

/// Decode one sRGB-encoded value in `[0, 1]` to linear light.
#[inline]
pub fn srgb_to_linear(x: f32) -> f32 {
    if x <= ENCODED_CUTOFF {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// `[0, 1]` clamp that sends NaN to 0.
#[inline]
pub(crate) fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// sRGB-encode every channel of a float raster.
pub fn encode_srgb(raster: &Raster<f32, 3>) -> UnitRaster {
    raster.map_channels(linear_to_srgb)
}

/// Linearize an 8-bit sRGB raster (values divided by 255 first).
pub fn decode_srgb(raster: &DisplayRaster) -> LinearRaster {
    raster.map(|p| p.map(|c| srgb_to_linear(f32::from(c) / 255.0)))
}

/// Linearize a float sRGB raster already in `[0, 1]`.
pub fn decode_srgb_unit(raster: &UnitRaster) -> LinearRaster {
    raster.map_channels(srgb_to_linear)
}
