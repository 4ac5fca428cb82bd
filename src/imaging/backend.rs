//! Image codec trait and shared error type.
//!
//! The [`ImageCodec`] trait is the only place compressed image bytes enter
//! or leave the crate: PNG encoding for output and 8-bit RGB decoding for
//! the SDR/HDR JPEG pair. Everything on either side of it works on
//! [`Raster`](crate::raster::Raster) values.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.

use crate::raster::DisplayRaster;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image too large to encode: {width}x{height}")]
    TooLarge { width: usize, height: usize },
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
    #[error("Decoding failed: {0}")]
    DecodeFailed(String),
}

/// Trait for image codecs.
///
/// `Sync` so a single codec can be shared across rayon workers in batch
/// renders.
pub trait ImageCodec: Sync {
    /// Encode an 8-bit sRGB raster as a PNG byte stream.
    fn encode_png(&self, raster: &DisplayRaster) -> Result<Vec<u8>, CodecError>;

    /// Decode any supported image (JPEG, PNG) into 8-bit RGB.
    fn decode_rgb8(&self, bytes: &[u8]) -> Result<DisplayRaster, CodecError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::raster::Raster;
    use std::sync::Mutex;

    /// Mock codec that records operations instead of compressing anything.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    ///
    /// `encode_png` returns the raster's interleaved samples prefixed by
    /// `MOCK`, so tests can inspect exactly what would have been encoded.
    #[derive(Default)]
    pub struct MockCodec {
        pub decode_results: Mutex<Vec<DisplayRaster>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        EncodePng { width: usize, height: usize },
        DecodeRgb8 { len: usize },
    }

    pub const MOCK_MAGIC: &[u8] = b"MOCK";

    impl MockCodec {
        pub fn new() -> Self {
            Self::default()
        }

        /// Decoded rasters are handed out in the given order.
        pub fn with_decoded(mut rasters: Vec<DisplayRaster>) -> Self {
            rasters.reverse();
            Self {
                decode_results: Mutex::new(rasters),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    /// Strip the mock prefix from an encoded buffer.
    pub fn mock_samples(encoded: &[u8]) -> &[u8] {
        encoded.strip_prefix(MOCK_MAGIC).expect("not a mock encoding")
    }

    impl ImageCodec for MockCodec {
        fn encode_png(&self, raster: &DisplayRaster) -> Result<Vec<u8>, CodecError> {
            self.operations.lock().unwrap().push(RecordedOp::EncodePng {
                width: raster.width(),
                height: raster.height(),
            });
            let mut out = MOCK_MAGIC.to_vec();
            out.extend(raster.to_interleaved());
            Ok(out)
        }

        fn decode_rgb8(&self, bytes: &[u8]) -> Result<DisplayRaster, CodecError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::DecodeRgb8 { len: bytes.len() });
            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| CodecError::DecodeFailed("No mock raster".to_string()))
        }
    }

    #[test]
    fn mock_records_encode() {
        let codec = MockCodec::new();
        let raster: DisplayRaster = Raster::filled(3, 2, [1, 2, 3]);

        let bytes = codec.encode_png(&raster).unwrap();
        assert_eq!(mock_samples(&bytes).len(), 18);

        let ops = codec.get_operations();
        assert_eq!(
            ops,
            vec![RecordedOp::EncodePng {
                width: 3,
                height: 2
            }]
        );
    }

    #[test]
    fn mock_decodes_in_order() {
        let first: DisplayRaster = Raster::filled(1, 1, [1, 1, 1]);
        let second: DisplayRaster = Raster::filled(1, 1, [2, 2, 2]);
        let codec = MockCodec::with_decoded(vec![first.clone(), second.clone()]);

        assert_eq!(codec.decode_rgb8(b"a").unwrap(), first);
        assert_eq!(codec.decode_rgb8(b"bb").unwrap(), second);
        assert!(codec.decode_rgb8(b"ccc").is_err());
        assert_eq!(codec.get_operations().len(), 3);
        assert!(matches!(
            codec.get_operations()[1],
            RecordedOp::DecodeRgb8 { len: 2 }
        ));
    }
}
