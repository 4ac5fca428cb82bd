//! Image encoding and decoding in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Quantize** | [`quantize`]: `[0, 1]` floats → `u8` |
//! | **Encode → PNG** | `image::codecs::png::PngEncoder` |
//! | **Decode JPEG/PNG → RGB8** | `image::ImageReader` |
//!
//! The module is split into:
//! - **Backend**: [`ImageCodec`] trait + [`CodecError`]
//! - **Rust backend**: [`RustCodec`], the `image` crate implementation
//! - **Export**: [`export_png`], the float raster → PNG byte adapter

pub mod backend;
pub mod export;
pub mod rust_backend;

pub use backend::{CodecError, ImageCodec};
pub use export::{export_png, quantize};
pub use rust_backend::RustCodec;
