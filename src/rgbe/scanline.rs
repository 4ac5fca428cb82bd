//! New-style run-length-encoded scanline decoding.
//!
//! Each scanline starts with `2, 2, width_hi, width_lo`, followed by the
//! four channels (R, G, B, E) encoded one after another across the whole
//! row. Within a channel a count byte `> 128` is a run (`count - 128`
//! copies of the next byte) and a count byte `<= 128` is a literal span of
//! `count` bytes.

use super::FormatError;
use super::cursor::Cursor;
use crate::raster::RgbeRaster;
use tracing::trace;

const CHANNEL_NAMES: [&str; 4] = ["R", "G", "B", "E"];

/// Decode `height` scanlines of `width` pixels starting at `offset`.
pub(crate) fn decode_scanlines(
    data: &[u8],
    offset: usize,
    width: usize,
    height: usize,
) -> Result<RgbeRaster, FormatError> {
    let mut cursor = Cursor::at(data, offset);
    // Grown row by row so a truncated file never reserves its declared size.
    let mut pixels = Vec::new();
    let mut row_pixels = vec![[0u8; 4]; width];

    for row in 0..height {
        read_scanline_header(&mut cursor, row, width)?;
        for channel in 0..4 {
            decode_channel(&mut cursor, row, channel, &mut row_pixels)?;
        }
        pixels.extend_from_slice(&row_pixels);
    }

    trace!(
        width,
        height,
        trailing = cursor.remaining(),
        "decoded scanlines"
    );
    RgbeRaster::from_pixels(width, height, pixels)
        .map_err(|_| FormatError::InvalidResolution(format!("{width}x{height}")))
}

fn read_scanline_header(cursor: &mut Cursor, row: usize, width: usize) -> Result<(), FormatError> {
    let offset = cursor.position();
    let [m0, m1, hi, lo] = cursor
        .read_array::<4>()
        .ok_or(FormatError::UnexpectedEof { row, offset })?;
    if m0 != 2 || m1 != 2 {
        return Err(FormatError::UnsupportedEncoding {
            row,
            marker: [m0, m1],
        });
    }
    let found = u16::from_be_bytes([hi, lo]) as usize;
    if found != width {
        return Err(FormatError::WidthMismatch {
            row,
            expected: width,
            found,
        });
    }
    Ok(())
}

/// Fill channel `channel` of every pixel in `row_pixels`.
fn decode_channel(
    cursor: &mut Cursor,
    row: usize,
    channel: usize,
    row_pixels: &mut [[u8; 4]],
) -> Result<(), FormatError> {
    let width = row_pixels.len();
    let mut column = 0;

    while column < width {
        let offset = cursor.position();
        let count = cursor
            .read_u8()
            .ok_or(FormatError::UnexpectedEof { row, offset })?;

        let (len, is_run) = if count > 128 {
            ((count - 128) as usize, true)
        } else {
            (count as usize, false)
        };
        if column + len > width {
            return Err(FormatError::RowOverrun {
                row,
                channel: CHANNEL_NAMES[channel],
                column,
                count: len,
            });
        }
        let target = &mut row_pixels[column..column + len];

        if is_run {
            let value = cursor.read_u8().ok_or(FormatError::TruncatedRun {
                row,
                channel: CHANNEL_NAMES[channel],
                offset: cursor.position(),
            })?;
            for pixel in target {
                pixel[channel] = value;
            }
        } else {
            let literal = cursor.read_slice(len).ok_or(FormatError::TruncatedLiteral {
                row,
                channel: CHANNEL_NAMES[channel],
                offset: cursor.position(),
                len,
            })?;
            for (pixel, &value) in target.iter_mut().zip(literal) {
                pixel[channel] = value;
            }
        }
        column += len;
    }
    Ok(())
}
