use super::codes;
use super::types::{Diagnostic, DiagnosticLevel, Report, SideReport, REPORT_SCHEMA_VERSION};
use crate::compositor::{Artboard, CompositorInfo, ScratchMetadata};
use crate::plate::Side;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Append-only accumulator for a job's report. The pipeline records
/// facts as it learns them; nothing is ever removed or rewritten.
#[derive(Debug)]
pub struct ReportBuilder {
    job_id: String,
    illustrator: CompositorInfo,
    artboards: Vec<Artboard>,
    sides: Vec<SideReport>,
    plates_detected: BTreeMap<String, Vec<String>>,
    outputs: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl ReportBuilder {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            illustrator: CompositorInfo::default(),
            artboards: Vec::new(),
            sides: Vec::new(),
            plates_detected: BTreeMap::new(),
            outputs: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn set_compositor_info(&mut self, info: CompositorInfo) {
        self.illustrator = info;
    }

    pub fn add_artboard(&mut self, artboard: Artboard) {
        self.artboards.push(artboard);
    }

    /// Folds the compositor's scratch metadata in: application info,
    /// artboards, and any warnings or errors the export script logged.
    pub fn merge_scratch(&mut self, scratch: &ScratchMetadata) {
        if let Some(info) = &scratch.illustrator {
            self.illustrator = info.clone();
        }
        for artboard in &scratch.artboards {
            self.artboards.push(artboard.clone());
        }
        for note in &scratch.warnings {
            self.add_warning(codes::COMPOSITOR_WARNING, format!("{}: {}", note.code, note.message));
        }
        for note in &scratch.errors {
            self.add_error(codes::COMPOSITOR_WARNING, format!("{}: {}", note.code, note.message));
        }
    }

    pub fn add_side(&mut self, side_report: SideReport) {
        self.sides.push(side_report);
    }

    pub fn set_plates_detected(&mut self, side: Side, index: u32, inks: Vec<String>) {
        self.plates_detected
            .insert(format!("{}_{}", side, index), inks);
    }

    pub fn add_output(&mut self, stem: impl Into<String>, filename: impl Into<String>) {
        self.outputs.insert(stem.into(), filename.into());
    }

    pub fn add_info(&mut self, code: &str, detail: impl Into<String>) {
        self.push(DiagnosticLevel::Info, code, detail.into());
    }

    pub fn add_warning(&mut self, code: &str, detail: impl Into<String>) {
        self.push(DiagnosticLevel::Warning, code, detail.into());
    }

    pub fn add_error(&mut self, code: &str, detail: impl Into<String>) {
        self.push(DiagnosticLevel::Error, code, detail.into());
    }

    fn push(&mut self, level: DiagnosticLevel, code: &str, detail: String) {
        debug!(job_id = %self.job_id, ?level, code, detail, "Diagnostic");
        self.diagnostics.push(Diagnostic {
            level,
            code: code.to_string(),
            detail,
        });
    }

    pub fn build(self) -> Report {
        Report {
            schema: REPORT_SCHEMA_VERSION,
            job_id: self.job_id,
            illustrator: self.illustrator,
            artboards: self.artboards,
            sides: self.sides,
            plates_detected: self.plates_detected,
            outputs: self.outputs,
            diagnostics: self.diagnostics,
        }
    }
}

/// Persists a report as pretty JSON.
pub async fn save_report(report: &Report, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(report).map_err(std::io::Error::other)?;
    tokio::fs::write(path, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::ScratchNote;
    use crate::report::SideStatus;

    #[test]
    fn test_builder_accumulates() {
        let mut builder = ReportBuilder::new("j1");
        builder.set_plates_detected(Side::Front, 0, vec!["Cyan".into(), "foil".into()]);
        builder.add_output("front_layer_0_foil", "front_layer_0_foil.png");
        builder.add_warning("X", "y");
        builder.add_side(SideReport {
            side: Side::Front,
            index: 0,
            finishes: vec!["foil".into()],
            die: false,
            status: SideStatus::Ok,
            error: None,
        });
        let report = builder.build();
        assert_eq!(report.schema, REPORT_SCHEMA_VERSION);
        assert_eq!(report.plates_detected["front_0"].len(), 2);
        assert_eq!(
            report.outputs["front_layer_0_foil"],
            "front_layer_0_foil.png"
        );
        assert_eq!(report.diagnostics.len(), 1);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_merge_scratch_folds_everything_in() {
        let scratch = ScratchMetadata {
            illustrator: Some(CompositorInfo {
                version: "28.0".into(),
                pdf_preset: "PDF/X-4".into(),
                doc_color: "CMYK".into(),
            }),
            artboards: vec![Artboard {
                name: "front".into(),
                index: 0,
                bounds: [0.0, 0.0, 144.0, 72.0],
            }],
            sides: Vec::new(),
            warnings: vec![ScratchNote {
                code: "FONT_MISSING".into(),
                message: "Futura not found".into(),
            }],
            errors: Vec::new(),
        };
        let mut builder = ReportBuilder::new("j1");
        builder.merge_scratch(&scratch);
        let report = builder.build();
        assert_eq!(report.illustrator.version, "28.0");
        assert_eq!(report.artboards.len(), 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].level, DiagnosticLevel::Warning);
    }

    #[tokio::test]
    async fn test_save_report_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results").join("report.json");
        let report = ReportBuilder::new("j1").build();
        save_report(&report, &path).await.unwrap();
        let loaded: Report =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.job_id, "j1");
    }
}
