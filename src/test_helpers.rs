//! Shared test utilities for building Radiance byte streams by hand.
//!
//! The decoder tests need malformed and edge-case files that the reference
//! writer in [`crate::rgbe::writer`] would never produce, so these helpers
//! assemble them piece by piece.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let mut body = scanline_header(2);
//! for _ in 0..4 {
//!     body.extend(channel_literal(&[3, 4]));
//! }
//! let raster = decode(&hdr_file(2, 1, &body)).unwrap();
//! ```

use crate::rgbe::writer::header_bytes;

// =========================================================================
// Byte-level builders
// =========================================================================

/// A new-style scanline header: `[2, 2, width_hi, width_lo]`.
pub fn scanline_header(width: usize) -> Vec<u8> {
    vec![2, 2, (width >> 8) as u8, (width & 0xff) as u8]
}

/// One literal op: the count byte followed by the bytes themselves.
pub fn channel_literal(bytes: &[u8]) -> Vec<u8> {
    assert!(bytes.len() <= 128, "literal op holds at most 128 bytes");
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    out
}

/// Radiance header for `width × height` followed by a raw scanline body.
pub fn hdr_file(width: usize, height: usize, body: &[u8]) -> Vec<u8> {
    let mut out = header_bytes(width, height);
    out.extend_from_slice(body);
    out
}

// =========================================================================
// Fixtures
// =========================================================================

/// 2×2 grey image: mantissas `[10, 20]` / `[30, 40]`, all with exponent 128.
///
/// At exposure 1.8 this tone-maps to 72, 98, 116 and 129.
pub fn sample_2x2_hdr() -> Vec<u8> {
    let mut body = Vec::new();
    for row in [[10u8, 20], [30, 40]] {
        body.extend(scanline_header(2));
        for _ in 0..3 {
            body.extend(channel_literal(&row));
        }
        body.extend(channel_literal(&[128, 128]));
    }
    hdr_file(2, 2, &body)
}
