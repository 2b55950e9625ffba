//! Types shared across the compositor phase.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::plate::SideSpec;

/// Result of a successful export run.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Scratch metadata the script wrote, if any. Absence is a warning,
    /// not a failure; downstream phases fall back to default sides.
    pub scratch: Option<ScratchMetadata>,
    /// Wall-clock duration of the export.
    pub elapsed: Duration,
}

/// Best-effort document description written by the export script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScratchMetadata {
    #[serde(default)]
    pub illustrator: Option<CompositorInfo>,
    #[serde(default)]
    pub artboards: Vec<Artboard>,
    #[serde(default)]
    pub sides: Vec<ScratchSide>,
    #[serde(default)]
    pub warnings: Vec<ScratchNote>,
    #[serde(default)]
    pub errors: Vec<ScratchNote>,
}

impl ScratchMetadata {
    /// Declared sides converted to specs, unknown side names skipped.
    pub fn side_specs(&self) -> Vec<SideSpec> {
        self.sides.iter().filter_map(|s| s.to_spec()).collect()
    }
}

/// Application/version information for the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositorInfo {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_pdf_preset")]
    pub pdf_preset: String,
    #[serde(default = "default_doc_color")]
    pub doc_color: String,
}

impl Default for CompositorInfo {
    fn default() -> Self {
        Self {
            version: default_version(),
            pdf_preset: default_pdf_preset(),
            doc_color: default_doc_color(),
        }
    }
}

fn default_version() -> String {
    "unknown".to_string()
}

fn default_pdf_preset() -> String {
    "PDF/X-4".to_string()
}

fn default_doc_color() -> String {
    "CMYK".to_string()
}

/// One artboard as reported by the script. Bounds are [x0, y0, x1, y1]
/// in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artboard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub bounds: [f64; 4],
}

/// A side as written into scratch metadata. The side name stays a raw
/// string here so one misnamed side cannot poison the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchSide {
    pub side: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finishes: Vec<String>,
    #[serde(default)]
    pub die: bool,
}

impl ScratchSide {
    pub fn to_spec(&self) -> Option<SideSpec> {
        let side = match self.side.parse() {
            Ok(side) => side,
            Err(e) => {
                warn!("Skipping scratch side: {}", e);
                return None;
            }
        };
        Some(SideSpec {
            side,
            index: self.index,
            finishes: self.finishes.clone(),
            die: self.die,
        })
    }
}

/// Coded warning or error carried in scratch metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchNote {
    #[serde(default = "default_code")]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

fn default_code() -> String {
    "UNKNOWN".to_string()
}

/// Loads scratch metadata, returning None when missing or malformed.
pub async fn load_scratch(path: &Path) -> Option<ScratchMetadata> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(_) => return None,
    };
    match serde_json::from_str(&raw) {
        Ok(scratch) => Some(scratch),
        Err(e) => {
            warn!(path = %path.display(), "Malformed scratch metadata: {}", e);
            None
        }
    }
}
