use crate::compositor::{Artboard, CompositorInfo};
use crate::plate::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Bumped whenever the report shape changes incompatibly.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideReport {
    pub side: Side,
    pub index: u32,
    pub finishes: Vec<String>,
    pub die: bool,
    pub status: SideStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The persisted job report. Field names are wire format; the
/// compositor section keeps its historical `illustrator` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub schema: u32,
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub illustrator: CompositorInfo,
    pub artboards: Vec<Artboard>,
    pub sides: Vec<SideReport>,
    /// Ink names per side, keyed `{side}_{index}`.
    pub plates_detected: BTreeMap<String, Vec<String>>,
    /// Output stem to filename, relative to the job's results directory.
    pub outputs: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }
}

/// Written to the failed-job archive so a failure stays inspectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: bool,
    pub message: String,
    #[serde(rename = "jobId")]
    pub job_id: String,
}

impl ErrorReport {
    pub fn new(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            job_id: job_id.into(),
        }
    }

    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path, body).await
    }
}
