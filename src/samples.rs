//! Sample discovery in an assets directory.
//!
//! ## Directory Structure
//!
//! ```text
//! assets/
//! ├── HDR_041_Path_Ref.hdr     # HDR sample "HDR_041_Path_Ref"
//! ├── street_sdr.jpg           # ┐ gain-map pair sample "street"
//! ├── street_hdr.jpg           # ┘
//! ├── lonely_sdr.jpg           # one-sided pair: skipped with a warning
//! └── notes.txt                # ignored
//! ```
//!
//! Only the top level is scanned. Extensions are matched case-insensitively
//! (`.HDR`, `.JPEG` are fine). Samples are returned sorted by id.

use crate::pipeline::PreconditionError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0}")]
    Precondition(#[from] PreconditionError),
}

/// A renderable input found in the assets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: String,
    pub kind: SampleKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleKind {
    /// A Radiance `.hdr` file.
    Hdr { path: PathBuf },
    /// An SDR/HDR JPEG exposure pair for the gain-map pipeline.
    GainMapPair { sdr: PathBuf, hdr: PathBuf },
}

impl Sample {
    /// The `.hdr` path, or `None` for a pair sample.
    pub fn hdr_path(&self) -> Option<&Path> {
        match &self.kind {
            SampleKind::Hdr { path } => Some(path),
            SampleKind::GainMapPair { .. } => None,
        }
    }

    /// The `(sdr, hdr)` JPEG paths, or `None` for an HDR sample.
    pub fn pair_paths(&self) -> Option<(&Path, &Path)> {
        match &self.kind {
            SampleKind::GainMapPair { sdr, hdr } => Some((sdr, hdr)),
            SampleKind::Hdr { .. } => None,
        }
    }

    /// [`Sample::hdr_path`], or `WrongSampleKind`.
    pub fn require_hdr(&self) -> Result<&Path, PreconditionError> {
        self.hdr_path()
            .ok_or_else(|| PreconditionError::WrongSampleKind {
                id: self.id.clone(),
                expected: "an .hdr file",
            })
    }

    /// [`Sample::pair_paths`], or `WrongSampleKind`.
    pub fn require_pair(&self) -> Result<(&Path, &Path), PreconditionError> {
        self.pair_paths()
            .ok_or_else(|| PreconditionError::WrongSampleKind {
                id: self.id.clone(),
                expected: "an SDR/HDR JPEG pair",
            })
    }

    /// Short label for listings.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            SampleKind::Hdr { .. } => "hdr",
            SampleKind::GainMapPair { .. } => "pair",
        }
    }
}

/// One side of a JPEG pair.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PairSide {
    Sdr,
    Hdr,
}

#[derive(Default)]
struct PendingPair {
    sdr: Option<PathBuf>,
    hdr: Option<PathBuf>,
}

fn lower_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Split `street_sdr` into `("street", Sdr)`.
fn pair_stem(stem: &str) -> Option<(&str, PairSide)> {
    let lower = stem.to_ascii_lowercase();
    let side = if lower.ends_with("_sdr") {
        PairSide::Sdr
    } else if lower.ends_with("_hdr") {
        PairSide::Hdr
    } else {
        return None;
    };
    let id = &stem[..stem.len() - 4];
    (!id.is_empty()).then_some((id, side))
}

/// Find every sample in `dir`, sorted by id.
///
/// A missing directory is [`PreconditionError::MissingInput`]. Pairs with
/// only one side present are skipped.
pub fn discover(dir: &Path) -> Result<Vec<Sample>, SampleError> {
    if !dir.is_dir() {
        return Err(PreconditionError::MissingInput(dir.to_path_buf()).into());
    }

    let mut samples = Vec::new();
    let mut pairs: BTreeMap<String, PendingPair> = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if stem.starts_with('.') {
            continue;
        }

        match lower_extension(path).as_str() {
            "hdr" => samples.push(Sample {
                id: stem,
                kind: SampleKind::Hdr {
                    path: path.to_path_buf(),
                },
            }),
            "jpg" | "jpeg" => match pair_stem(&stem) {
                Some((id, side)) => {
                    let pending = pairs.entry(id.to_string()).or_default();
                    let slot = match side {
                        PairSide::Sdr => &mut pending.sdr,
                        PairSide::Hdr => &mut pending.hdr,
                    };
                    *slot = Some(path.to_path_buf());
                }
                None => debug!(path = %path.display(), "ignoring JPEG without _sdr/_hdr suffix"),
            },
            _ => {}
        }
    }

    for (id, pending) in pairs {
        match (pending.sdr, pending.hdr) {
            (Some(sdr), Some(hdr)) => samples.push(Sample {
                id,
                kind: SampleKind::GainMapPair { sdr, hdr },
            }),
            (sdr, _) => {
                let missing = if sdr.is_none() { "_sdr" } else { "_hdr" };
                warn!(id = %id, missing, "skipping incomplete gain-map pair");
            }
        }
    }

    samples.sort_by(|a, b| a.id.cmp(&b.id).then(a.kind_label().cmp(b.kind_label())));
    debug!(dir = %dir.display(), count = samples.len(), "discovered samples");
    Ok(samples)
}

/// Look up a sample by id.
pub fn resolve<'a>(samples: &'a [Sample], id: &str) -> Result<&'a Sample, PreconditionError> {
    samples
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| PreconditionError::UnknownSample {
            id: id.to_string(),
            available: samples.iter().map(|s| s.id.clone()).collect(),
        })
}
