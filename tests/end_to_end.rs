//! End-to-end renders through the real `image` backend.
//!
//! Fixtures are written with the crate's own Radiance writer and the
//! `image` crate's JPEG encoder into temp directories, then pushed through
//! the same pipeline calls the CLI makes.

use image::{GenericImageView, RgbImage};
use rgbe_preview::color::DEFAULT_EXPOSURE;
use rgbe_preview::config;
use rgbe_preview::imaging::RustCodec;
use rgbe_preview::pipeline::{
    self, PipelineError, PreconditionError, RenderSettings, gain_map_files, render_batch,
    render_file,
};
use rgbe_preview::raster::{Raster, RgbeRaster};
use rgbe_preview::rgbe;
use rgbe_preview::samples;
use rgbe_preview::viewer;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixtures
// =========================================================================

/// Grey 2×2 image with mantissas 10, 20 / 30, 40 at exponent 128.
fn grey_2x2() -> RgbeRaster {
    let values = [[10u8, 20], [30, 40]];
    Raster::from_fn(2, 2, |x, y| {
        let v = values[y][x];
        [v, v, v, 128]
    })
}

/// A wide image with long flat spans so the compressed writer emits runs.
fn banded(width: usize, height: usize) -> RgbeRaster {
    Raster::from_fn(width, height, |x, y| {
        let band = (x / 16) as u8;
        [band * 20, (y * 10) as u8, 200 - band * 10, 126 + band % 4]
    })
}

/// Smooth gradient kept below mid-grey so base recovery never clips.
fn gradient_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = 40 + (x * 120 / width) as u8;
        let g = 60 + (y * 100 / height) as u8;
        image::Rgb([r, g, 90])
    });
    img.save(path).unwrap();
}

fn decode_png(path: &Path) -> image::RgbImage {
    image::open(path).unwrap().to_rgb8()
}

// =========================================================================
// HDR render
// =========================================================================

#[test]
fn two_by_two_renders_reference_pixels() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("tiny.hdr");
    std::fs::write(&input, rgbe::encode_literal_only(&grey_2x2())).unwrap();
    let output = tmp.path().join("out/tiny.png");

    let report = render_file(
        &RustCodec::new(),
        &input,
        &output,
        &RenderSettings {
            exposure: DEFAULT_EXPOSURE,
        },
    )
    .unwrap();
    assert_eq!((report.width, report.height), (2, 2));
    assert_eq!(report.size, std::fs::metadata(&output).unwrap().len());

    let png = decode_png(&output);
    assert_eq!(png.dimensions(), (2, 2));
    let expected = [[72i32, 98], [116, 129]];
    for y in 0..2u32 {
        for x in 0..2u32 {
            let px = png.get_pixel(x, y).0;
            let want = expected[y as usize][x as usize];
            assert!(
                (i32::from(px[0]) - want).abs() <= 1,
                "pixel ({x}, {y}) = {px:?}, expected ~{want}"
            );
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }
}

#[test]
fn compressed_and_literal_files_render_identically() {
    let tmp = TempDir::new().unwrap();
    let raster = banded(96, 5);
    let literal = tmp.path().join("literal.hdr");
    let compressed = tmp.path().join("compressed.hdr");
    std::fs::write(&literal, rgbe::encode_literal_only(&raster)).unwrap();
    std::fs::write(&compressed, rgbe::encode(&raster)).unwrap();

    let codec = RustCodec::new();
    let settings = RenderSettings::default();
    render_file(&codec, &literal, &tmp.path().join("a.png"), &settings).unwrap();
    render_file(&codec, &compressed, &tmp.path().join("b.png"), &settings).unwrap();

    let a = decode_png(&tmp.path().join("a.png"));
    let b = decode_png(&tmp.path().join("b.png"));
    assert_eq!(a.dimensions(), (96, 5));
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn higher_exposure_is_brighter() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("tiny.hdr");
    std::fs::write(&input, rgbe::encode(&grey_2x2())).unwrap();
    let codec = RustCodec::new();

    let dim = tmp.path().join("dim.png");
    let bright = tmp.path().join("bright.png");
    render_file(&codec, &input, &dim, &RenderSettings { exposure: 0.5 }).unwrap();
    render_file(&codec, &input, &bright, &RenderSettings { exposure: 8.0 }).unwrap();

    let dim = decode_png(&dim);
    let bright = decode_png(&bright);
    for (d, b) in dim.pixels().zip(bright.pixels()) {
        assert!(b.0[0] > d.0[0]);
    }
}

#[test]
fn truncated_file_reports_the_row() {
    let tmp = TempDir::new().unwrap();
    let mut bytes = rgbe::encode_literal_only(&grey_2x2());
    bytes.truncate(bytes.len() - 3);
    let input = tmp.path().join("cut.hdr");
    std::fs::write(&input, bytes).unwrap();

    let output = tmp.path().join("cut.png");
    let err = render_file(
        &RustCodec::new(),
        &input,
        &output,
        &RenderSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Format(_)));
    assert!(err.to_string().contains("row 1"), "{err}");
    assert!(!output.exists());
}

#[test]
fn hdr_page_links_rendered_png() {
    let bytes = rgbe::encode(&grey_2x2());
    let header = rgbe::read_header(&bytes).unwrap();
    let html = viewer::render_hdr_page(
        &header,
        "tiny.png",
        DEFAULT_EXPOSURE,
        &config::ViewerConfig::default(),
        "tiny",
    )
    .into_string();
    assert!(html.contains(r#"src="tiny.png""#));
    assert!(html.contains("32-bit_rle_rgbe"));
}

// =========================================================================
// Gain map
// =========================================================================

#[test]
fn gain_map_pair_reconstructs_hdr_input() {
    let tmp = TempDir::new().unwrap();
    let sdr = tmp.path().join("street_sdr.jpg");
    let hdr = tmp.path().join("street_hdr.jpg");
    gradient_jpeg(&sdr, 32, 24);
    gradient_jpeg(&hdr, 32, 24);

    let render = gain_map_files(&RustCodec::new(), &sdr, &hdr, 0.0).unwrap();
    assert_eq!((render.width, render.height), (32, 24));
    assert!(render.mean_abs_error < 1e-3, "{}", render.mean_abs_error);

    for png in [
        &render.sdr_png,
        &render.hdr_png,
        &render.gain_png,
        &render.base_png,
        &render.boosted_png,
    ] {
        let img = image::load_from_memory(png).unwrap();
        assert_eq!(img.dimensions(), (32, 24));
    }
}

#[test]
fn gain_map_rejects_mismatched_pair() {
    let tmp = TempDir::new().unwrap();
    let sdr = tmp.path().join("a_sdr.jpg");
    let hdr = tmp.path().join("a_hdr.jpg");
    gradient_jpeg(&sdr, 16, 16);
    gradient_jpeg(&hdr, 16, 8);

    let err = gain_map_files(&RustCodec::new(), &sdr, &hdr, 0.0).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Precondition(PreconditionError::ShapeMismatch(_))
    ));
}

#[test]
fn viewer_page_is_self_contained() {
    let tmp = TempDir::new().unwrap();
    let sdr = tmp.path().join("street_sdr.jpg");
    let hdr = tmp.path().join("street_hdr.jpg");
    gradient_jpeg(&sdr, 16, 16);
    gradient_jpeg(&hdr, 16, 16);

    let render = gain_map_files(&RustCodec::new(), &sdr, &hdr, 1.0).unwrap();
    let html = viewer::render_viewer(&render, &config::ViewerConfig::default(), "street")
        .into_string();
    let path = tmp.path().join("generated/street-viewer.html");
    pipeline::write_output(&path, html.as_bytes()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.matches("data:image/png;base64,").count(), 5);
    assert!(!written.contains("<link"));
    assert!(written.contains("<script>"));
}

// =========================================================================
// Batch over discovered samples
// =========================================================================

#[test]
fn batch_renders_discovered_hdr_samples() {
    let tmp = TempDir::new().unwrap();
    let assets = tmp.path().join("assets");
    std::fs::create_dir(&assets).unwrap();
    std::fs::write(assets.join("b.hdr"), rgbe::encode(&banded(40, 3))).unwrap();
    std::fs::write(assets.join("a.hdr"), rgbe::encode(&grey_2x2())).unwrap();
    gradient_jpeg(&assets.join("street_sdr.jpg"), 8, 8);
    gradient_jpeg(&assets.join("street_hdr.jpg"), 8, 8);

    let found = samples::discover(&assets).unwrap();
    assert_eq!(found.len(), 3);

    let out = tmp.path().join("generated");
    let reports = render_batch(
        &RustCodec::new(),
        &found,
        &out,
        &RenderSettings::default(),
        None,
    )
    .unwrap();

    let outputs: Vec<_> = reports.iter().map(|r| r.output.clone()).collect();
    assert_eq!(outputs, vec![out.join("a.png"), out.join("b.png")]);
    assert_eq!(decode_png(&out.join("b.png")).dimensions(), (40, 3));
    assert!(!out.join("street.png").exists());
}

#[test]
fn config_file_drives_render_settings() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("config.toml"),
        "[tone_map]\nexposure = 3.5\n",
    )
    .unwrap();

    let config = config::load_config(tmp.path()).unwrap();
    assert_eq!(RenderSettings::from_config(&config).exposure, 3.5);
    assert_eq!(config.samples.dir, "assets");
}
