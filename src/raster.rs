//! Fixed-channel raster type shared by every pipeline stage.
//!
//! A [`Raster`] is a `width × height` grid of pixels, each an `[T; N]`
//! array, stored row-major with the top row first (the order Radiance
//! scanlines arrive in). Channel count is part of the type, so an RGBE
//! raster (`Raster<u8, 4>`) cannot be handed to a stage expecting linear
//! RGB (`Raster<f32, 3>`).
//!
//! Rasters are built once and never mutated afterwards: there is no
//! `get_mut`, and every transform ([`Raster::map`], [`Raster::zip_map`])
//! allocates a new raster. Binary transforms check dimensions up front and
//! fail with [`ShapeMismatch`] instead of broadcasting.
//!
//! | Alias | Pixel | Meaning |
//! |---|---|---|
//! | [`RgbeRaster`] | `[u8; 4]` | Decoded R, G, B mantissas + shared exponent |
//! | [`LinearRaster`] | `[f32; 3]` | Linear light, `[0, +inf)` |
//! | [`UnitRaster`] | `[f32; 3]` | Stage output already in `[0, 1]` |
//! | [`DisplayRaster`] | `[u8; 3]` | sRGB-encoded 8-bit, PNG input |
//! | [`GainMap`] | `[f32; 1]` | Gain ratios clamped to `[0.5, 4.0]` |

use thiserror::Error;

/// Two rasters combined by one operation do not have the same dimensions,
/// or a pixel buffer does not match the declared dimensions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("raster size mismatch: expected {expected_width}x{expected_height}, found {found_width}x{found_height}")]
pub struct ShapeMismatch {
    pub expected_width: usize,
    pub expected_height: usize,
    pub found_width: usize,
    pub found_height: usize,
}

/// RGBE raster as produced by the decoder.
pub type RgbeRaster = Raster<u8, 4>;
/// Linear-light RGB, unbounded above zero.
pub type LinearRaster = Raster<f32, 3>;
/// RGB floats already clamped to `[0, 1]` (tone-mapped or sRGB-encoded).
pub type UnitRaster = Raster<f32, 3>;
/// 8-bit sRGB raster handed to the PNG codec.
pub type DisplayRaster = Raster<u8, 3>;
/// Single-channel gain ratios.
pub type GainMap = Raster<f32, 1>;

#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T, const N: usize> {
    width: usize,
    height: usize,
    pixels: Vec<[T; N]>,
}

impl<T: Copy, const N: usize> Raster<T, N> {
    /// Build a raster by evaluating `f(x, y)` for every pixel, row by row.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> [T; N]) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Raster with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: [T; N]) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major pixel buffer.
    ///
    /// Fails when `pixels.len() != width * height`; the mismatch is reported
    /// as a one-row raster of the buffer's length.
    pub fn from_pixels(
        width: usize,
        height: usize,
        pixels: Vec<[T; N]>,
    ) -> Result<Self, ShapeMismatch> {
        if pixels.len() != width * height {
            return Err(ShapeMismatch {
                expected_width: width,
                expected_height: height,
                found_width: pixels.len(),
                found_height: 1,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from interleaved samples (`width * height * N` values).
    pub fn from_interleaved(width: usize, height: usize, samples: &[T]) -> Result<Self, ShapeMismatch> {
        if samples.len() != width * height * N {
            return Err(ShapeMismatch {
                expected_width: width,
                expected_height: height,
                found_width: samples.len() / N.max(1),
                found_height: 1,
            });
        }
        let pixels = samples
            .chunks_exact(N)
            .map(|chunk| std::array::from_fn(|c| chunk[c]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel.
    pub const fn channels(&self) -> usize {
        N
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, row `y`, or `None` outside the raster.
    pub fn get(&self, x: usize, y: usize) -> Option<&[T; N]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x)
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[[T; N]] {
        &self.pixels
    }

    /// One row of pixels, or `None` past the last row.
    pub fn row(&self, y: usize) -> Option<&[[T; N]]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.pixels.get(start..start + self.width)
    }

    /// Flatten to interleaved samples (`R G B R G B ...`).
    pub fn to_interleaved(&self) -> Vec<T> {
        self.pixels.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Per-pixel transform into a new raster of the same size.
    pub fn map<U: Copy, const M: usize>(&self, f: impl Fn(&[T; N]) -> [U; M]) -> Raster<U, M> {
        Raster {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(f).collect(),
        }
    }

    /// Per-pixel transform of two equally-sized rasters.
    pub fn zip_map<U: Copy, V: Copy, const K: usize, const M: usize>(
        &self,
        other: &Raster<U, K>,
        f: impl Fn(&[T; N], &[U; K]) -> [V; M],
    ) -> Result<Raster<V, M>, ShapeMismatch> {
        self.ensure_same_shape(other)?;
        Ok(Raster {
            width: self.width,
            height: self.height,
            pixels: self
                .pixels
                .iter()
                .zip(other.pixels.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }

    /// Error unless `other` has the same width and height.
    pub fn ensure_same_shape<U, const K: usize>(
        &self,
        other: &Raster<U, K>,
    ) -> Result<(), ShapeMismatch> {
        if (self.width, self.height) != (other.width, other.height) {
            return Err(ShapeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                found_width: other.width,
                found_height: other.height,
            });
        }
        Ok(())
    }
}

impl<const N: usize> Raster<f32, N> {
    /// Every channel of `f` applied elementwise.
    pub fn map_channels(&self, f: impl Fn(f32) -> f32) -> Self {
        self.map(|p| p.map(&f))
    }
}
