//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! HDR_041_Path_Ref (2048 × 1024, exposure 1.80)
//!     Source: assets/HDR_041_Path_Ref.hdr
//! Wrote generated/HDR_041_Path_Ref.png (2.41 MB)
//! Wrote generated/HDR_041_Path_Ref.html
//! ```
//!
//! ## Gain map
//!
//! ```text
//! street (640 × 480, +1.00 EV)
//!     SDR: assets/street_sdr.jpg
//!     HDR: assets/street_hdr.jpg
//!     Reconstruction error: 0.00213
//! Wrote generated/street-viewer.html (1.12 MB)
//! ```
//!
//! ## Batch
//!
//! Renders run in parallel, so lines arrive in completion order.
//!
//! ```text
//! Rendering HDR_041_Path_Ref (assets/HDR_041_Path_Ref.hdr)
//! Rendering street_night (assets/street_night.hdr)
//! street_night → generated/street_night.png (1.87 MB)
//! HDR_041_Path_Ref → generated/HDR_041_Path_Ref.png (2.41 MB)
//!
//! Rendered 2 samples (4.28 MB)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{BatchEvent, GainMapRender, RenderReport};
use crate::rgbe::Header;
use crate::samples::{Sample, SampleKind};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Bytes as mebibytes with two decimals (`2.41`).
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// `Wrote <path> (<size> MB)`.
pub fn wrote_line(path: &Path, bytes: u64) -> String {
    format!("Wrote {} ({} MB)", path.display(), format_size_mb(bytes))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Format the result of a single HDR render.
pub fn format_render_output(
    id: &str,
    report: &RenderReport,
    exposure: f32,
    page: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} ({} × {}, exposure {:.2})",
            id, report.width, report.height, exposure
        ),
        format!("{}Source: {}", indent(1), report.input.display()),
        wrote_line(&report.output, report.size),
    ];
    if let Some(page) = page {
        lines.push(format!("Wrote {}", page.display()));
    }
    lines
}

/// Print render output to stdout.
pub fn print_render_output(id: &str, report: &RenderReport, exposure: f32, page: Option<&Path>) {
    print_lines(format_render_output(id, report, exposure, page));
}

// ============================================================================
// gain-map
// ============================================================================

/// Format the result of a gain-map render.
pub fn format_gain_map_output(
    id: &str,
    sdr: &Path,
    hdr: &Path,
    render: &GainMapRender,
    viewer_path: &Path,
    viewer_size: u64,
) -> Vec<String> {
    vec![
        format!(
            "{} ({} × {}, {:+.2} EV)",
            id, render.width, render.height, render.ev
        ),
        format!("{}SDR: {}", indent(1), sdr.display()),
        format!("{}HDR: {}", indent(1), hdr.display()),
        format!(
            "{}Reconstruction error: {:.5}",
            indent(1),
            render.mean_abs_error
        ),
        wrote_line(viewer_path, viewer_size),
    ]
}

/// Print gain-map output to stdout.
pub fn print_gain_map_output(
    id: &str,
    sdr: &Path,
    hdr: &Path,
    render: &GainMapRender,
    viewer_path: &Path,
    viewer_size: u64,
) {
    print_lines(format_gain_map_output(
        id,
        sdr,
        hdr,
        render,
        viewer_path,
        viewer_size,
    ));
}

// ============================================================================
// batch
// ============================================================================

/// Format a single batch progress event as display lines.
///
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { id, input } => {
            vec![format!("Rendering {} ({})", id, input.display())]
        }
        BatchEvent::Rendered { id, report } => vec![format!(
            "{} \u{2192} {} ({} MB)",
            id,
            report.output.display(),
            format_size_mb(report.size)
        )],
    }
}

/// Format the batch summary once every render has finished.
pub fn format_batch_summary(reports: &[RenderReport]) -> Vec<String> {
    let total: u64 = reports.iter().map(|r| r.size).sum();
    let noun = if reports.len() == 1 {
        "sample"
    } else {
        "samples"
    };
    vec![
        String::new(),
        format!(
            "Rendered {} {} ({} MB)",
            reports.len(),
            noun,
            format_size_mb(total)
        ),
    ]
}

/// Print batch summary to stdout.
pub fn print_batch_summary(reports: &[RenderReport]) {
    print_lines(format_batch_summary(reports));
}

// ============================================================================
// samples
// ============================================================================

/// Format the discovered sample list.
///
/// ```text
/// 001 HDR_041_Path_Ref [hdr]
///     Source: assets/HDR_041_Path_Ref.hdr
/// 002 street [pair]
///     SDR: assets/street_sdr.jpg
///     HDR: assets/street_hdr.jpg
/// ```
pub fn format_samples_output(samples: &[Sample], dir: &Path) -> Vec<String> {
    if samples.is_empty() {
        return vec![format!("No samples in {}", dir.display())];
    }
    let mut lines = Vec::new();
    for (i, sample) in samples.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            sample.id,
            sample.kind_label()
        ));
        match &sample.kind {
            SampleKind::Hdr { path } => {
                lines.push(format!("{}Source: {}", indent(1), path.display()));
            }
            SampleKind::GainMapPair { sdr, hdr } => {
                lines.push(format!("{}SDR: {}", indent(1), sdr.display()));
                lines.push(format!("{}HDR: {}", indent(1), hdr.display()));
            }
        }
    }
    lines
}

/// Print sample list to stdout.
pub fn print_samples_output(samples: &[Sample], dir: &Path) {
    print_lines(format_samples_output(samples, dir));
}

// ============================================================================
// info
// ============================================================================

/// Format a parsed Radiance header.
///
/// ```text
/// assets/HDR_041_Path_Ref.hdr
///     Size: 2048 × 1024
///     Program: RADIANCE
///     Scanline data at byte 68
///     EXPOSURE = 1.0
///     FORMAT = 32-bit_rle_rgbe
/// ```
pub fn format_info_output(path: &Path, header: &Header) -> Vec<String> {
    let mut lines = vec![
        path.display().to_string(),
        format!("{}Size: {} × {}", indent(1), header.width, header.height),
    ];
    if let Some(program) = &header.program {
        lines.push(format!("{}Program: {}", indent(1), program));
    }
    lines.push(format!(
        "{}Scanline data at byte {}",
        indent(1),
        header.data_offset
    ));
    for (key, value) in &header.variables {
        lines.push(format!("{}{} = {}", indent(1), key, value));
    }
    lines
}

/// Print header info to stdout.
pub fn print_info_output(path: &Path, header: &Header) {
    print_lines(format_info_output(path, header));
}
