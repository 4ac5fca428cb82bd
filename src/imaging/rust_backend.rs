//! Pure Rust codec on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Encode → PNG | `image::codecs::png::PngEncoder` (RGB8, into memory) |
//! | Decode (JPEG, PNG) | `image::ImageReader` with format sniffing, then `to_rgb8` |

use super::backend::{CodecError, ImageCodec};
use crate::raster::{DisplayRaster, Raster};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Codec using the `image` crate's pure Rust encoders and decoders.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn dimensions_u32(raster: &DisplayRaster) -> Result<(u32, u32), CodecError> {
    let too_large = || CodecError::TooLarge {
        width: raster.width(),
        height: raster.height(),
    };
    let width = u32::try_from(raster.width()).map_err(|_| too_large())?;
    let height = u32::try_from(raster.height()).map_err(|_| too_large())?;
    Ok((width, height))
}

impl ImageCodec for RustCodec {
    fn encode_png(&self, raster: &DisplayRaster) -> Result<Vec<u8>, CodecError> {
        let (width, height) = dimensions_u32(raster)?;
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&raster.to_interleaved(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| CodecError::EncodeFailed(format!("PNG encode failed: {e}")))?;
        Ok(out)
    }

    fn decode_rgb8(&self, bytes: &[u8]) -> Result<DisplayRaster, CodecError> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()
            .map_err(|e| CodecError::DecodeFailed(format!("Failed to decode image: {e}")))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Raster::from_interleaved(width as usize, height as usize, img.as_raw())
            .map_err(|e| CodecError::DecodeFailed(e.to_string()))
    }
}
