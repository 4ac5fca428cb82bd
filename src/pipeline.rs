//! Stage orchestration: decode → color → export.
//!
//! Two pipelines share the same color and export stages:
//!
//! ```text
//! HDR render   .hdr bytes ─ rgbe::decode ─ rgbe_to_linear ─ tone_map ─ export_png
//! Gain map     SDR + HDR rasters ─ decode_srgb ─ estimate_gain_map ─┬─ recover_base ─ export_png
//!                                                                 └─ reconstruct  ─ export_png
//! ```
//!
//! The pure functions ([`render_hdr`], [`gain_map_pair`]) work on bytes and
//! rasters. The `*_file` variants add filesystem access around them, and
//! [`render_batch`] fans file renders out across the rayon pool.
//!
//! ## Output Structure
//!
//! ```text
//! generated/
//! ├── HDR_041_Path_Ref.png        # render / batch
//! ├── HDR_041_Path_Ref.html       # render
//! ├── street-sdr.png              # gain-map
//! ├── street-hdr.png
//! ├── street-gain.png
//! ├── street-base.png
//! ├── street-boosted.png
//! └── street-viewer.html
//! ```

use crate::color::{self, DEFAULT_EXPOSURE};
use crate::config::PreviewConfig;
use crate::imaging::{CodecError, ImageCodec, export_png};
use crate::raster::{DisplayRaster, ShapeMismatch};
use crate::rgbe::{self, FormatError, Header};
use crate::samples::Sample;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

/// Inputs that are wrong before any pixel is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionError {
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("Unknown sample {id:?} (available: {})", .available.join(", "))]
    UnknownSample { id: String, available: Vec<String> },
    #[error("SDR and HDR inputs differ in size: {0}")]
    ShapeMismatch(#[from] ShapeMismatch),
    #[error("Sample {id:?} is not {expected}")]
    WrongSampleKind { id: String, expected: &'static str },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HDR decode failed: {0}")]
    Format(#[from] FormatError),
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),
    #[error("Image codec failed: {0}")]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ShapeMismatch> for PipelineError {
    fn from(e: ShapeMismatch) -> Self {
        Self::Precondition(e.into())
    }
}

/// Parameters for HDR renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Linear multiplier applied before Reinhard compression.
    pub exposure: f32,
}

impl RenderSettings {
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            exposure: config.tone_map.exposure,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            exposure: DEFAULT_EXPOSURE,
        }
    }
}

/// In-memory result of [`render_hdr`].
#[derive(Debug, Clone)]
pub struct RenderedHdr {
    pub header: Header,
    pub png: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// What [`render_file`] wrote.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: usize,
    pub height: usize,
    /// Size of the written PNG in bytes.
    pub size: u64,
    /// Header of the rendered file, parsed during the render.
    pub header: Header,
}

/// Every image produced by the gain-map pipeline, PNG-encoded.
#[derive(Debug, Clone)]
pub struct GainMapRender {
    pub width: usize,
    pub height: usize,
    pub ev: f32,
    /// The SDR input, re-encoded.
    pub sdr_png: Vec<u8>,
    /// The HDR input, re-encoded.
    pub hdr_png: Vec<u8>,
    /// Grey-scale gain visualisation.
    pub gain_png: Vec<u8>,
    /// Recovered SDR base.
    pub base_png: Vec<u8>,
    /// Base × gain, shifted by `ev`.
    pub boosted_png: Vec<u8>,
    /// Mean absolute linear difference between boosted and HDR input.
    pub mean_abs_error: f32,
}

/// Progress notifications from [`render_batch`].
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { id: String, input: PathBuf },
    Rendered { id: String, report: RenderReport },
}

/// Decode, tone-map and PNG-encode a Radiance file held in memory.
pub fn render_hdr(
    codec: &impl ImageCodec,
    bytes: &[u8],
    exposure: f32,
) -> Result<RenderedHdr, PipelineError> {
    let (header, rgbe) = rgbe::decode_with_header(bytes)?;
    let linear = color::rgbe_to_linear(&rgbe);
    let mapped = color::tone_map(&linear, exposure);
    let png = export_png(codec, &mapped, false)?;
    debug!(
        width = header.width,
        height = header.height,
        exposure,
        png_bytes = png.len(),
        "rendered HDR"
    );
    Ok(RenderedHdr {
        width: header.width,
        height: header.height,
        header,
        png,
    })
}

/// Render `input` to a PNG at `output`, creating parent directories.
pub fn render_file(
    codec: &impl ImageCodec,
    input: &Path,
    output: &Path,
    settings: &RenderSettings,
) -> Result<RenderReport, PipelineError> {
    if !input.is_file() {
        return Err(PreconditionError::MissingInput(input.to_path_buf()).into());
    }
    let bytes = std::fs::read(input)?;
    let rendered = render_hdr(codec, &bytes, settings.exposure)?;

    write_output(output, &rendered.png)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        "wrote tone-mapped PNG"
    );
    Ok(RenderReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        width: rendered.width,
        height: rendered.height,
        size: rendered.png.len() as u64,
        header: rendered.header,
    })
}

/// Write `bytes` to `path`, creating the parent directory if needed.
pub fn write_output(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)?,
        _ => {}
    }
    std::fs::write(path, bytes)
}

/// Estimate a gain map from the HDR exposure and reconstruct a boosted image.
///
/// Both rasters must have the same dimensions; that is checked before any
/// color stage runs.
pub fn gain_map_pair(
    codec: &impl ImageCodec,
    sdr: &DisplayRaster,
    hdr: &DisplayRaster,
    ev: f32,
) -> Result<GainMapRender, PipelineError> {
    sdr.ensure_same_shape(hdr)?;

    let hdr_linear = color::decode_srgb(hdr);
    let gain = color::estimate_gain_map(&hdr_linear);
    let base = color::recover_base(&hdr_linear, &gain)?;
    let boosted = color::reconstruct(&base, &gain, ev)?;
    let mean_abs_error = color::mean_abs_error(&boosted, &hdr_linear)?;
    debug!(
        width = hdr.width(),
        height = hdr.height(),
        ev,
        mean_abs_error,
        "estimated gain map"
    );

    Ok(GainMapRender {
        width: hdr.width(),
        height: hdr.height(),
        ev,
        sdr_png: codec.encode_png(sdr)?,
        hdr_png: codec.encode_png(hdr)?,
        gain_png: export_png(codec, &color::visualize_gain(&gain), false)?,
        base_png: export_png(codec, &base, true)?,
        boosted_png: export_png(codec, &boosted, true)?,
        mean_abs_error,
    })
}

/// Read and decode an SDR/HDR JPEG pair, then run [`gain_map_pair`].
pub fn gain_map_files(
    codec: &impl ImageCodec,
    sdr_path: &Path,
    hdr_path: &Path,
    ev: f32,
) -> Result<GainMapRender, PipelineError> {
    for path in [sdr_path, hdr_path] {
        if !path.is_file() {
            return Err(PreconditionError::MissingInput(path.to_path_buf()).into());
        }
    }
    let sdr = codec.decode_rgb8(&std::fs::read(sdr_path)?)?;
    let hdr = codec.decode_rgb8(&std::fs::read(hdr_path)?)?;
    gain_map_pair(codec, &sdr, &hdr, ev)
}

/// Render every HDR sample into `output_dir/<id>.png` in parallel.
///
/// Pair samples are skipped. Reports come back in sample order. The first
/// failure aborts the batch with that error.
pub fn render_batch(
    codec: &impl ImageCodec,
    samples: &[Sample],
    output_dir: &Path,
    settings: &RenderSettings,
    events: Option<Sender<BatchEvent>>,
) -> Result<Vec<RenderReport>, PipelineError> {
    std::fs::create_dir_all(output_dir)?;

    let jobs: Vec<(&str, &Path)> = samples
        .iter()
        .filter_map(|s| s.hdr_path().map(|path| (s.id.as_str(), path)))
        .collect();
    info!(count = jobs.len(), "rendering batch");

    jobs.into_par_iter()
        .map_with(events, |events, (id, input)| {
            if let Some(tx) = events {
                tx.send(BatchEvent::Started {
                    id: id.to_string(),
                    input: input.to_path_buf(),
                })
                .ok();
            }
            let output = output_dir.join(format!("{id}.png"));
            let report = render_file(codec, input, &output, settings)?;
            if let Some(tx) = events {
                tx.send(BatchEvent::Rendered {
                    id: id.to_string(),
                    report: report.clone(),
                })
                .ok();
            }
            Ok(report)
        })
        .collect()
}
