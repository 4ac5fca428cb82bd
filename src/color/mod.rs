//! Linear-light color pipeline.
//!
//! Every function here is pure: it takes a raster by reference and returns
//! a new one. Values stay unclamped in linear light until a stage that has
//! to produce displayable output (exposure, tone mapping, sRGB encoding).
//!
//! | Submodule | Stage |
//! |---|---|
//! | [`transfer`] | sRGB encode / decode |
//! | [`tonemap`] | RGBE → linear, Reinhard tone map, EV exposure |
//! | [`gain`] | Luminance, box blur, gain-map estimation, base recovery, reconstruction |

pub mod gain;
pub mod tonemap;
pub mod transfer;

pub use gain::{
    box_blur, broadcast, estimate_gain_map, luminance, mean_abs_error, reconstruct, recover_base,
    visualize_gain,
};
pub use tonemap::{DEFAULT_EXPOSURE, apply_exposure, reinhard, rgbe_to_linear, tone_map};
pub use transfer::{decode_srgb, decode_srgb_unit, encode_srgb, linear_to_srgb, srgb_to_linear};
