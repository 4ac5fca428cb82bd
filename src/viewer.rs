//! HTML preview pages.
//!
//! ## Generated Pages
//!
//! - **Gain-map viewer** (`<id>-viewer.html`): self-contained comparison page.
//!   Every image is embedded as a `data:image/png;base64,...` URI, so the
//!   file can be opened or moved on its own.
//! - **HDR page** (`<id>.html`): shows a tone-mapped render next to it on
//!   disk (`<id>.png`) with its header metadata.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/viewer.css`: Base styles (colors injected from config)
//! - `static/slider.js`: Before/after slider for the comparison view
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated text is escaped.

use crate::config::{self, ViewerConfig};
use crate::pipeline::GainMapRender;
use crate::rgbe::Header;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/viewer.css");
const JS: &str = include_str!("../static/slider.js");

/// Embed PNG bytes as a data URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

fn page_css(viewer: &ViewerConfig) -> String {
    format!("{}\n\n{}", config::generate_viewer_css(viewer), CSS_STATIC)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn figure(caption: &str, src: &str, alt: &str) -> Markup {
    html! {
        figure {
            h2 { (caption) }
            img src=(src) alt=(alt);
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Gain-map comparison page for one SDR/HDR pair.
///
/// The slider compares the SDR input (left) with the boosted reconstruction
/// (right). Below it are the gain map, the recovered base and the original
/// HDR exposure.
pub fn render_viewer(render: &GainMapRender, viewer: &ViewerConfig, title: &str) -> Markup {
    let page_title = format!("{} - {}", viewer.title, title);
    let boosted_label = format!("Boosted ({:+.1} EV)", render.ev);

    let content = html! {
        main.viewer {
            h1 { (page_title) }
            div.compare data-compare="split" {
                img.before src=(png_data_uri(&render.sdr_png)) alt="SDR input";
                img.after src=(png_data_uri(&render.boosted_png)) alt=(boosted_label);
                div.divider {}
            }
            div.compare-labels {
                span { "SDR" }
                span { (boosted_label) }
            }
            input.slider id="split" type="range" min="0" max="100" value="50"
                aria-label="Comparison split";
            section.panels {
                (figure("Gain map", &png_data_uri(&render.gain_png), "Gain map, log2 scale"))
                (figure("Recovered base", &png_data_uri(&render.base_png), "Recovered SDR base"))
                (figure("HDR exposure", &png_data_uri(&render.hdr_png), "Original HDR exposure"))
            }
        }
        footer {
            dl {
                dt { "Dimensions" }
                dd { (render.width) " × " (render.height) }
                dt { "EV boost" }
                dd { (format!("{:+.2}", render.ev)) }
                dt { "Reconstruction error" }
                dd { (format!("{:.5}", render.mean_abs_error)) " mean absolute (linear)" }
            }
        }
        script { (PreEscaped(JS)) }
    };

    base_document(&page_title, &page_css(viewer), Some("gain-map"), content)
}

/// Page for a single tone-mapped HDR render.
///
/// `png_href` is the PNG's path relative to the page.
pub fn render_hdr_page(
    header: &Header,
    png_href: &str,
    exposure: f32,
    viewer: &ViewerConfig,
    title: &str,
) -> Markup {
    let content = html! {
        main.render {
            h1 { (title) }
            figure {
                img src=(png_href) alt=(title) width=(header.width) height=(header.height);
            }
        }
        footer {
            dl {
                dt { "Dimensions" }
                dd { (header.width) " × " (header.height) }
                dt { "Exposure" }
                dd { (format!("{exposure:.2}")) }
                @if let Some(program) = &header.program {
                    dt { "Program" }
                    dd { (program) }
                }
                @for (key, value) in &header.variables {
                    dt { (key) }
                    dd { (value) }
                }
            }
        }
    };

    base_document(title, &page_css(viewer), Some("hdr-render"), content)
}
