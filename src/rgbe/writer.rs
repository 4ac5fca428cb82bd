//! Reference Radiance writer.
//!
//! Produces files the decoder accepts: a `#?RADIANCE` header, a
//! `-Y h +X w` resolution line and new-style RLE scanlines. Used to build
//! fixtures and to check the decoder against an independent encoder.

use crate::raster::RgbeRaster;

/// Largest width expressible in a scanline header that still leaves the
/// high bit of the first width byte clear.
pub const MAX_RLE_WIDTH: usize = 0x7fff;

const MIN_RUN: usize = 4;
const MAX_RUN: usize = 127;
const MAX_LITERAL: usize = 128;

/// Encode with run compression wherever 4 or more equal bytes repeat.
///
/// # Panics
///
/// If the raster is wider than [`MAX_RLE_WIDTH`].
pub fn encode(raster: &RgbeRaster) -> Vec<u8> {
    encode_with(raster, encode_channel)
}

/// Encode every channel as literal spans only, no run ops.
pub fn encode_literal_only(raster: &RgbeRaster) -> Vec<u8> {
    encode_with(raster, encode_channel_literal)
}

fn encode_with(raster: &RgbeRaster, channel_encoder: fn(&[u8], &mut Vec<u8>)) -> Vec<u8> {
    let (width, height) = raster.dimensions();
    assert!(width <= MAX_RLE_WIDTH, "width {width} exceeds RLE limit");

    let mut out = header_bytes(width, height);
    let mut channel = vec![0u8; width];
    for y in 0..height {
        out.extend_from_slice(&[2, 2, (width >> 8) as u8, (width & 0xff) as u8]);
        let Some(row) = raster.row(y) else { break };
        for c in 0..4 {
            for (dst, pixel) in channel.iter_mut().zip(row) {
                *dst = pixel[c];
            }
            channel_encoder(&channel, &mut out);
        }
    }
    out
}

/// `#?RADIANCE` header block plus resolution line.
pub fn header_bytes(width: usize, height: usize) -> Vec<u8> {
    format!("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y {height} +X {width}\n").into_bytes()
}

fn encode_channel(data: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < data.len() {
        let run = run_length(data, i);
        if run >= MIN_RUN {
            out.push((128 + run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < data.len() && i - start < MAX_LITERAL && run_length(data, i) < MIN_RUN {
            i += 1;
        }
        out.push((i - start) as u8);
        out.extend_from_slice(&data[start..i]);
    }
}

fn encode_channel_literal(data: &[u8], out: &mut Vec<u8>) {
    for chunk in data.chunks(MAX_LITERAL) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

fn run_length(data: &[u8], start: usize) -> usize {
    data[start..]
        .iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == data[start])
        .count()
}
