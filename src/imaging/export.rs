//! Float raster → 8-bit PNG bytes.
//!
//! The core ends here: [`export_png`] returns bytes and writing them to
//! disk is left to the caller.

use super::backend::{CodecError, ImageCodec};
use crate::color::encode_srgb;
use crate::raster::{DisplayRaster, UnitRaster};

/// `round(clamp(x, 0, 1) * 255)` per channel. NaN becomes 0.
pub fn quantize(raster: &UnitRaster) -> DisplayRaster {
    raster.map(|p| p.map(quantize_channel))
}

#[inline]
fn quantize_channel(x: f32) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Quantize and PNG-encode a float RGB raster.
///
/// With `apply_srgb_encode` the raster is treated as linear light and
/// sRGB-encoded first; without it the values are assumed display-ready
/// (for example the output of [`tone_map`](crate::color::tone_map)).
pub fn export_png(
    codec: &impl ImageCodec,
    raster: &UnitRaster,
    apply_srgb_encode: bool,
) -> Result<Vec<u8>, CodecError> {
    let display = if apply_srgb_encode {
        quantize(&encode_srgb(raster))
    } else {
        quantize(raster)
    };
    codec.encode_png(&display)
}
