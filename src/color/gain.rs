//! Luminance-based gain-map estimation and reconstruction.
//!
//! The gain map is the ratio between each pixel's luminance and the mean
//! luminance of its 9×9 neighbourhood. Dividing the HDR image by it gives
//! an approximate SDR base; multiplying the base back by it (optionally
//! shifted by some EV) reconstructs the HDR image. Blur and clamping make
//! the round trip lossy, never exact.

use super::tonemap::apply_exposure;
use super::transfer::clamp_unit;
use crate::raster::{GainMap, LinearRaster, Raster, ShapeMismatch, UnitRaster};

/// BT.2020 luma weights for linear R, G, B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2627, 0.6780, 0.0593];
/// Side of the square box filter used for the local luminance average.
pub const BLUR_SIZE: usize = 9;
/// Lower gain bound.
pub const GAIN_MIN: f32 = 0.5;
/// Upper gain bound.
pub const GAIN_MAX: f32 = 4.0;
/// Added to denominators so near-black regions stay finite.
pub const EPSILON: f32 = 1e-5;

/// Weighted sum of linear R, G, B per pixel.
pub fn luminance(linear: &LinearRaster) -> Raster<f32, 1> {
    linear.map(|p| {
        [p.iter()
            .zip(LUMA_WEIGHTS)
            .map(|(c, w)| c * w)
            .sum::<f32>()]
    })
}

/// `size × size` mean filter with clamp-to-edge padding.
///
/// The output has the input's dimensions. Border pixels average over the
/// window with out-of-range coordinates clamped to the nearest edge, so a
/// uniform image stays uniform. Even sizes are rounded up to the next odd
/// size.
pub fn box_blur(src: &Raster<f32, 1>, size: usize) -> Raster<f32, 1> {
    if src.is_empty() {
        return src.clone();
    }
    let radius = size / 2;
    let (width, height) = src.dimensions();
    let values: Vec<f32> = src.pixels().iter().map(|p| p[0]).collect();

    let horizontal = blur_pass(&values, width, height, radius, Axis::Horizontal);
    let both = blur_pass(&horizontal, width, height, radius, Axis::Vertical);

    Raster::from_fn(width, height, |x, y| [both[y * width + x]])
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One separable sliding-window pass along `axis`.
fn blur_pass(src: &[f32], width: usize, height: usize, radius: usize, axis: Axis) -> Vec<f32> {
    let (len, lines) = match axis {
        Axis::Horizontal => (width, height),
        Axis::Vertical => (height, width),
    };
    let index = |line: usize, i: usize| match axis {
        Axis::Horizontal => line * width + i,
        Axis::Vertical => i * width + line,
    };
    let inv_size = 1.0 / (2 * radius + 1) as f64;
    let mut dst = vec![0.0f32; src.len()];

    for line in 0..lines {
        let at = |i: isize| f64::from(src[index(line, i.clamp(0, len as isize - 1) as usize)]);
        let r = radius as isize;
        // f64 running sum: f32 drifts after large values leave the window.
        let mut sum: f64 = (-r..=r).map(at).sum();

        for i in 0..len {
            dst[index(line, i)] = (sum * inv_size) as f32;
            let i = i as isize;
            sum += at(i + r + 1) - at(i - r);
        }
    }
    dst
}

/// Estimate a gain map from an HDR linear raster.
///
/// `gain = luminance / (9×9 mean luminance + 1e-5)`, clamped to
/// `[GAIN_MIN, GAIN_MAX]`.
pub fn estimate_gain_map(hdr: &LinearRaster) -> GainMap {
    let (width, height) = hdr.dimensions();
    let luma = luminance(hdr);
    let local = box_blur(&luma, BLUR_SIZE);
    let (luma, local) = (luma.pixels(), local.pixels());
    Raster::from_fn(width, height, |x, y| {
        let i = y * width + x;
        [clamp_gain(luma[i][0] / (local[i][0] + EPSILON))]
    })
}

#[inline]
fn clamp_gain(g: f32) -> f32 {
    if g.is_nan() {
        GAIN_MIN
    } else {
        g.clamp(GAIN_MIN, GAIN_MAX)
    }
}

/// Repeat the single gain channel across R, G and B.
pub fn broadcast(gain: &GainMap) -> LinearRaster {
    gain.map(|&[g]| [g; 3])
}

/// Divide the HDR image by its gain map to get an approximate SDR base.
///
/// `base = clamp(hdr / (gain + 1e-5), 0, 1)`.
pub fn recover_base(hdr: &LinearRaster, gain: &GainMap) -> Result<LinearRaster, ShapeMismatch> {
    let gain_rgb = broadcast(gain);
    hdr.zip_map(&gain_rgb, |p, g| {
        std::array::from_fn(|c| clamp_unit(p[c] / (g[c] + EPSILON)))
    })
}

/// Multiply the base by the gain map and shift the result by `ev` stops.
///
/// The output is clamped to `[0, 1]` by [`apply_exposure`].
pub fn reconstruct(base: &LinearRaster, gain: &GainMap, ev: f32) -> Result<LinearRaster, ShapeMismatch> {
    let gain_rgb = broadcast(gain);
    let boosted = base.zip_map(&gain_rgb, |p, g| std::array::from_fn(|c| p[c] * g[c]))?;
    Ok(apply_exposure(&boosted, ev))
}

/// Mean absolute per-channel difference between two equally-sized rasters.
pub fn mean_abs_error(a: &LinearRaster, b: &LinearRaster) -> Result<f32, ShapeMismatch> {
    let diffs = a.zip_map(b, |p, q| [(0..3).map(|c| (p[c] - q[c]).abs()).sum::<f32>()])?;
    let samples = (a.pixels().len() * 3).max(1);
    Ok(diffs.pixels().iter().map(|d| d[0]).sum::<f32>() / samples as f32)
}

/// Grey-scale view of a gain map: `log2(gain)` mapped from `[-1, 2]` to
/// `[0, 1]`, so a gain of 1 sits at one third.
pub fn visualize_gain(gain: &GainMap) -> UnitRaster {
    let lo = GAIN_MIN.log2();
    let hi = GAIN_MAX.log2();
    gain.map(|&[g]| [clamp_unit((g.log2() - lo) / (hi - lo)); 3])
}
