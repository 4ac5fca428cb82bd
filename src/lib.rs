//! # rgbe-preview
//!
//! Turns Radiance `.hdr` files into PNGs a browser can show, and previews
//! how a gain map rebuilds an HDR exposure from an SDR base.
//!
//! # Architecture: Decode → Color → Export
//!
//! Every render runs the same three stages over immutable rasters:
//!
//! ```text
//! 1. Decode   .hdr bytes      →  RgbeRaster      (header + RLE scanlines)
//! 2. Color    RgbeRaster      →  UnitRaster      (linear light, tone map, sRGB)
//! 3. Export   UnitRaster      →  PNG bytes       (quantize + encode)
//! ```
//!
//! The gain-map pipeline swaps stage 1 for JPEG decoding of an SDR/HDR pair
//! and runs gain estimation, base recovery and reconstruction in stage 2.
//! Stages are plain functions over [`raster::Raster`] values, so each can be
//! tested without touching the filesystem or a real image codec.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`raster`] | Fixed-channel `Raster<T, N>` shared by every stage |
//! | [`rgbe`] | Radiance header parser, new-style RLE scanline decoder, reference writer |
//! | [`color`] | sRGB transfer, Reinhard tone map, luminance, box blur, gain maps |
//! | [`imaging`] | `ImageCodec` trait, `image`-crate backend, PNG export |
//! | [`pipeline`] | Stage orchestration for single renders, gain-map pairs and batches |
//! | [`samples`] | Discovery of `.hdr` files and `_sdr`/`_hdr` JPEG pairs in an assets directory |
//! | [`viewer`] | Maud-rendered HTML pages with embedded images and a comparison slider |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Strict Decoding
//!
//! Only new-style RLE scanlines are accepted. Any truncation, width mismatch
//! or run that overflows its row is a [`rgbe::FormatError`] naming the row,
//! and no partial image is returned.
//!
//! ## Unclamped Linear Light
//!
//! Values stay in `[0, +inf)` until tone mapping or sRGB encoding. Clamping
//! happens once, at the stage that has to produce display values.
//!
//! ## Self-Contained Viewer
//!
//! The gain-map viewer embeds every image as a base64 data URI and inlines
//! its CSS and JavaScript, so the HTML file can be opened or shared on its
//! own. HTML is built with [Maud](https://maud.lambda.xyz/), which escapes
//! all interpolated text.
//!
//! ## Pure-Rust Imaging
//!
//! PNG encoding and JPEG decoding go through the `image` crate behind the
//! [`imaging::ImageCodec`] trait. Pipeline tests substitute a recording mock.

pub mod color;
pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod raster;
pub mod rgbe;
pub mod samples;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
