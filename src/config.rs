//! Preview configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a user config file in the config directory (`--config`,
//! default `.`), and CLI flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [samples]
//! dir = "assets"                 # Where sample .hdr files and JPEG pairs live
//! default = "HDR_041_Path_Ref"   # Sample rendered when none is named
//!
//! [tone_map]
//! exposure = 1.8                 # Linear multiplier before Reinhard (> 0)
//!
//! [gain_map]
//! ev_boost = 0.0                 # EV shift for the reconstructed image (-8..8)
//!
//! [viewer]
//! title = "HDR gain map preview"
//! background = "#111111"
//! text = "#eeeeee"
//! accent = "#f0c040"             # Slider handle and links
//!
//! [processing]
//! max_processes = 4              # Max parallel workers for batch (omit for auto)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [tone_map]
//! exposure = 2.5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Largest EV shift accepted for `gain_map.ev_boost`, in either direction.
pub const MAX_EV_BOOST: f32 = 8.0;

/// Preview configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Sample discovery settings.
    pub samples: SamplesConfig,
    /// HDR tone-mapping settings.
    pub tone_map: ToneMapConfig,
    /// Gain-map reconstruction settings.
    pub gain_map: GainMapConfig,
    /// HTML viewer appearance.
    pub viewer: ViewerConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PreviewConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let exposure = self.tone_map.exposure;
        if !exposure.is_finite() || exposure <= 0.0 {
            return Err(ConfigError::Validation(
                "tone_map.exposure must be a positive finite number".into(),
            ));
        }
        let ev = self.gain_map.ev_boost;
        if !ev.is_finite() || ev.abs() > MAX_EV_BOOST {
            return Err(ConfigError::Validation(format!(
                "gain_map.ev_boost must be within [-{MAX_EV_BOOST}, {MAX_EV_BOOST}]"
            )));
        }
        if self.samples.default.trim().is_empty() {
            return Err(ConfigError::Validation(
                "samples.default must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("background", &self.viewer.background),
            ("text", &self.viewer.text),
            ("accent", &self.viewer.accent),
        ] {
            if !is_hex_color(value) {
                return Err(ConfigError::Validation(format!(
                    "viewer.{key} must be a hex color like #1a2b3c, got {value:?}"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// Where samples are discovered and which one is the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplesConfig {
    /// Assets directory scanned for samples. `--assets` overrides it.
    pub dir: String,
    /// Sample id used when a command names none.
    pub default: String,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            dir: "assets".to_string(),
            default: "HDR_041_Path_Ref".to_string(),
        }
    }
}

/// Tone-mapping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToneMapConfig {
    /// Linear multiplier applied before Reinhard compression.
    pub exposure: f32,
}

impl Default for ToneMapConfig {
    fn default() -> Self {
        Self {
            exposure: crate::color::DEFAULT_EXPOSURE,
        }
    }
}

/// Gain-map settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GainMapConfig {
    /// EV shift applied to the reconstructed (boosted) image.
    pub ev_boost: f32,
}

/// Viewer page appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Page title prefix.
    pub title: String,
    /// Page background color.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Slider handle, divider and link color.
    pub accent: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "HDR gain map preview".to_string(),
            background: "#111111".to_string(),
            text: "#eeeeee".to_string(),
            accent: "#f0c040".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PreviewConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PreviewConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PreviewConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<PreviewConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# rgbe-preview Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from the --config directory (default: current directory).
# Command-line flags override the values here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Samples
# ---------------------------------------------------------------------------
[samples]
# Directory scanned for samples. A NAME.hdr file is an HDR sample; a
# NAME_sdr.jpg + NAME_hdr.jpg pair is a gain-map sample.
dir = "assets"

# Sample rendered when a command names none.
default = "HDR_041_Path_Ref"

# ---------------------------------------------------------------------------
# Tone mapping (render, batch)
# ---------------------------------------------------------------------------
[tone_map]
# Linear multiplier applied before Reinhard compression. Must be > 0.
# Higher values brighten midtones; highlights still roll off smoothly.
exposure = 1.8

# ---------------------------------------------------------------------------
# Gain map (gain-map)
# ---------------------------------------------------------------------------
[gain_map]
# EV shift applied to the reconstructed image, within [-8, 8].
# 0 reconstructs the HDR exposure; 1 doubles it.
ev_boost = 0.0

# ---------------------------------------------------------------------------
# Viewer page
# ---------------------------------------------------------------------------
[viewer]
title = "HDR gain map preview"
background = "#111111"
text = "#eeeeee"
accent = "#f0c040"    # Slider handle, divider, links

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from viewer config.
pub fn generate_viewer_css(viewer: &ViewerConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-text: {text};
    --color-accent: {accent};
}}"#,
        background = viewer.background,
        text = viewer.text,
        accent = viewer.accent,
    )
}
