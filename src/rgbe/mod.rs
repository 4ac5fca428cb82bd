//! Radiance RGBE (`.hdr`) decoder.
//!
//! Supports exactly one layout: a text header terminated by a blank line,
//! a `-Y h +X w` style resolution line, then `h` new-style RLE scanlines.
//! Flat (uncompressed) and old-style RLE scanlines are rejected rather than
//! guessed at.
//!
//! ```text
//! #?RADIANCE                 ← header lines (recorded, not interpreted)
//! FORMAT=32-bit_rle_rgbe
//!                            ← blank line ends the header
//! -Y 512 +X 768              ← resolution
//! 02 02 03 00 <R ops> <G ops> <B ops> <E ops>   ← one scanline per row
//! ```
//!
//! Decoding is all-or-nothing: any malformed byte yields a [`FormatError`]
//! and no raster. The decoder returns raw RGBE bytes; conversion to linear
//! light lives in [`crate::color`].

mod cursor;
mod header;
mod scanline;
pub mod writer;

pub use header::{Header, parse_resolution, read_header};
pub use writer::{encode, encode_literal_only};

use crate::raster::RgbeRaster;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("HDR header not terminated")]
    HeaderNotTerminated,
    #[error("Missing resolution string")]
    MissingResolution,
    #[error("Unexpected resolution string: {0:?}")]
    InvalidResolution(String),
    #[error("Unexpected EOF at row {row} (byte offset {offset})")]
    UnexpectedEof { row: usize, offset: usize },
    #[error("Only new-style RLE scanlines are supported (row {row} starts with {marker:?})")]
    UnsupportedEncoding { row: usize, marker: [u8; 2] },
    #[error("Scanline width mismatch at row {row}: {found} != {expected}")]
    WidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Truncated RLE run in channel {channel} of row {row} (byte offset {offset})")]
    TruncatedRun {
        row: usize,
        channel: &'static str,
        offset: usize,
    },
    #[error(
        "Truncated RLE literal of {len} bytes in channel {channel} of row {row} (byte offset {offset})"
    )]
    TruncatedLiteral {
        row: usize,
        channel: &'static str,
        offset: usize,
        len: usize,
    },
    #[error("RLE op of {count} pixels overruns row {row} at column {column} in channel {channel}")]
    RowOverrun {
        row: usize,
        channel: &'static str,
        column: usize,
        count: usize,
    },
}

/// Decode a whole Radiance file held in memory.
pub fn decode(data: &[u8]) -> Result<RgbeRaster, FormatError> {
    decode_with_header(data).map(|(_, raster)| raster)
}

/// Decode a Radiance file and also return its parsed header.
pub fn decode_with_header(data: &[u8]) -> Result<(Header, RgbeRaster), FormatError> {
    let header = read_header(data)?;
    debug!(
        width = header.width,
        height = header.height,
        data_offset = header.data_offset,
        "parsed Radiance header"
    );
    let raster = scanline::decode_scanlines(data, header.data_offset, header.width, header.height)?;
    Ok((header, raster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::test_helpers::{channel_literal, hdr_file, sample_2x2_hdr, scanline_header};

    #[test]
    fn literal_roundtrip_is_exact() {
        let original = Raster::from_fn(13, 5, |x, y| {
            [
                (x * 17 + y) as u8,
                (x * 3 + y * 41) as u8,
                (255 - x - y) as u8,
                (120 + (x + y) % 16) as u8,
            ]
        });
        let bytes = encode_literal_only(&original);
        assert_eq!(decode(&bytes).unwrap(), original);
    }

    #[test]
    fn compressed_roundtrip_is_exact() {
        let original = Raster::from_fn(40, 3, |x, y| {
            let e = if x < 20 { 130 } else { 127 };
            [(x / 8) as u8, (y * 60) as u8, (x * y) as u8, e]
        });
        let bytes = encode(&original);
        assert!(bytes.len() < encode_literal_only(&original).len());
        assert_eq!(decode(&bytes).unwrap(), original);
    }

    #[test]
    fn run_channel_fills_every_column() {
        let width = 6;
        let mut body = scanline_header(width);
        body.extend_from_slice(&[128 + 6, 200]); // R: one run
        body.extend(channel_literal(&[1, 9, 4, 7, 3, 8])); // G: literals
        body.extend_from_slice(&[128 + 2, 5, 128 + 4, 6]); // B: two runs
        body.extend_from_slice(&[128 + 6, 128]); // E
        let raster = decode(&hdr_file(width, 1, &body)).unwrap();

        assert_eq!(raster.width(), width);
        let row = raster.row(0).unwrap();
        assert!(row.iter().all(|p| p[0] == 200));
        assert_eq!(row.iter().map(|p| p[1]).collect::<Vec<_>>(), [1, 9, 4, 7, 3, 8]);
        assert_eq!(row.iter().map(|p| p[2]).collect::<Vec<_>>(), [5, 5, 6, 6, 6, 6]);
        assert!(row.iter().all(|p| p[3] == 128));
    }

    #[test]
    fn two_by_two_fixture_decodes() {
        let raster = decode(&sample_2x2_hdr()).unwrap();
        assert_eq!(raster.dimensions(), (2, 2));
        assert_eq!(raster.get(0, 0), Some(&[10, 10, 10, 128]));
        assert_eq!(raster.get(1, 0), Some(&[20, 20, 20, 128]));
        assert_eq!(raster.get(0, 1), Some(&[30, 30, 30, 128]));
        assert_eq!(raster.get(1, 1), Some(&[40, 40, 40, 128]));
    }

    #[test]
    fn zero_count_is_an_empty_literal() {
        let mut body = scanline_header(2);
        for _ in 0..4 {
            body.push(0);
            body.extend(channel_literal(&[3, 4]));
        }
        let raster = decode(&hdr_file(2, 1, &body)).unwrap();
        assert_eq!(raster.get(1, 0), Some(&[4, 4, 4, 4]));
    }

    #[test]
    fn scanline_width_mismatch_reports_row() {
        // Row 0 is valid, row 1 declares width 5 against a header width of 4.
        let mut body = scanline_header(4);
        for _ in 0..4 {
            body.extend_from_slice(&[128 + 4, 1]);
        }
        body.extend(scanline_header(5));
        let err = decode(&hdr_file(4, 2, &body)).unwrap_err();
        assert_eq!(
            err,
            FormatError::WidthMismatch {
                row: 1,
                expected: 4,
                found: 5
            }
        );
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn flat_scanlines_are_rejected() {
        let body = vec![10, 20, 30, 128, 10, 20, 30, 128];
        let err = decode(&hdr_file(2, 1, &body)).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnsupportedEncoding {
                row: 0,
                marker: [10, 20]
            }
        );
    }

    #[test]
    fn missing_scanline_header_is_eof() {
        let err = decode(&hdr_file(2, 1, &[2, 2])).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { row: 0, .. }));
    }

    #[test]
    fn missing_count_byte_is_eof() {
        let mut body = scanline_header(2);
        body.extend(channel_literal(&[1, 2]));
        let err = decode(&hdr_file(2, 1, &body)).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { row: 0, .. }));
    }

    #[test]
    fn truncated_run_value() {
        let mut body = scanline_header(2);
        body.push(128 + 2);
        let err = decode(&hdr_file(2, 1, &body)).unwrap_err();
        assert!(matches!(err, FormatError::TruncatedRun { channel: "R", .. }));
    }

    #[test]
    fn truncated_literal_bytes() {
        let mut body = scanline_header(3);
        body.extend(channel_literal(&[1, 2, 3]));
        body.extend_from_slice(&[3, 9]);
        let err = decode(&hdr_file(3, 1, &body)).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedLiteral {
                channel: "G",
                len: 3,
                ..
            }
        ));
    }

    #[test]
    fn run_past_row_end_is_rejected() {
        let mut body = scanline_header(4);
        body.extend_from_slice(&[128 + 3, 1, 128 + 3, 1]);
        let err = decode(&hdr_file(4, 1, &body)).unwrap_err();
        assert_eq!(
            err,
            FormatError::RowOverrun {
                row: 0,
                channel: "R",
                column: 3,
                count: 3
            }
        );
    }

    #[test]
    fn huge_resolution_is_an_error_not_a_panic() {
        for res in ["4000000000 +X 4000000000", "99999999999 +X 99999999999"] {
            let mut data = format!("#?RADIANCE\n\n-Y {res}\n").into_bytes();
            data.extend_from_slice(&[2, 2, 0, 1]);
            assert!(matches!(
                decode(&data),
                Err(FormatError::InvalidResolution(_))
            ));
        }
    }

    #[test]
    fn tall_truncated_file_fails_at_first_missing_row() {
        let mut body = scanline_header(1);
        body.extend(channel_literal(&[1]).repeat(4));
        let err = decode(&hdr_file(1, 1_000_000_000, &body)).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { row: 1, .. }), "{err}");
    }

    #[test]
    fn header_errors_propagate() {
        assert_eq!(
            decode(b"#?RADIANCE\n").unwrap_err(),
            FormatError::HeaderNotTerminated
        );
        assert!(matches!(
            decode(b"#?RADIANCE\n\n+X 2 -Y 2\n"),
            Err(FormatError::InvalidResolution(_))
        ));
    }
}
