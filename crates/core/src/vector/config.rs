use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// Tool used for PDF to SVG conversion.
    pub executable: String,

    /// Ghostscript output device for vector export.
    pub device: String,

    pub timeout_secs: u64,

    /// Maximum drift, in plate pixels, between the SVG viewBox and the
    /// raster die mask before alignment is flagged.
    pub alignment_tolerance_px: f64,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            executable: "gs".to_string(),
            device: "svg".to_string(),
            timeout_secs: 120,
            alignment_tolerance_px: 2.0,
        }
    }
}
