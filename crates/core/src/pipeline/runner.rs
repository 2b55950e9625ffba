use super::error::PipelineError;
use super::types::{JobOutcome, JobPhase};
use crate::compositor::{Compositor, CompositorError};
use crate::config::JobsConfig;
use crate::metrics;
use crate::plate::{default_sides, output_filename, Finish, SideSpec};
use crate::raster::RasterOps;
use crate::report::{
    codes, save_report, ErrorReport, ReportBuilder, SideReport, SideStatus, validate_report,
};
use crate::separator::Separator;
use crate::vector::{check_alignment, parse_view_box, VectorExtractor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives one job through compositing, separation, die extraction and
/// report assembly.
///
/// Directory contract: the uploaded design sits under `incoming/`, all
/// intermediates under `working/{job_id}/`, finished plates plus
/// `report.json` under `results/{job_id}/`. A failed job's input and
/// working snapshot move to `failed/{job_id}/` next to an `error.json`.
/// The compositor writes one flattened PDF per side into the working
/// directory, named `{side}_{index}.pdf`.
pub struct JobPipeline {
    jobs: JobsConfig,
    compositor: Arc<dyn Compositor>,
    separator: Arc<dyn Separator>,
    vector: Arc<dyn VectorExtractor>,
    raster: Arc<dyn RasterOps>,
    plate_dpi: u32,
    alignment_tolerance_px: f64,
}

impl JobPipeline {
    pub fn new(
        jobs: JobsConfig,
        compositor: Arc<dyn Compositor>,
        separator: Arc<dyn Separator>,
        vector: Arc<dyn VectorExtractor>,
        raster: Arc<dyn RasterOps>,
        plate_dpi: u32,
        alignment_tolerance_px: f64,
    ) -> Self {
        Self {
            jobs,
            compositor,
            separator,
            vector,
            raster,
            plate_dpi,
            alignment_tolerance_px,
        }
    }

    fn side_pdf(work_dir: &Path, spec: &SideSpec) -> PathBuf {
        work_dir.join(format!("{}_{}.pdf", spec.side, spec.index))
    }

    /// Runs one job to completion. The caller holds the admission
    /// permit; this function assumes it is the only job running.
    pub async fn run(&self, job_id: &str, input: &Path) -> Result<JobOutcome, PipelineError> {
        let started = Instant::now();
        let work_dir = self.jobs.working().join(job_id);
        let results_dir = self.jobs.results().join(job_id);
        tokio::fs::create_dir_all(&work_dir).await?;
        tokio::fs::create_dir_all(&results_dir).await?;

        info!(job_id, input = %input.display(), "Job started");

        let outcome = match self.run_phases(job_id, input, &work_dir, &results_dir).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.archive_failure(job_id, input, &work_dir, &e.to_string())
                    .await;
                self.cleanup(job_id, input, &work_dir).await;
                metrics::JOBS_TOTAL.with_label_values(&["failed"]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["failed"])
                    .observe(started.elapsed().as_secs_f64());
                return Err(e);
            }
        };

        self.cleanup(job_id, input, &work_dir).await;
        metrics::JOBS_TOTAL.with_label_values(&["success"]).inc();
        metrics::JOB_DURATION
            .with_label_values(&["success"])
            .observe(started.elapsed().as_secs_f64());
        info!(
            job_id,
            elapsed_secs = started.elapsed().as_secs(),
            outputs = outcome.report.outputs.len(),
            "Job finished"
        );
        Ok(outcome)
    }

    async fn run_phases(
        &self,
        job_id: &str,
        input: &Path,
        work_dir: &Path,
        results_dir: &Path,
    ) -> Result<JobOutcome, PipelineError> {
        let started = Instant::now();
        let mut builder = ReportBuilder::new(job_id);

        // Phase 1: compositing.
        let phase_start = Instant::now();
        let export = self
            .compositor
            .run_export(job_id, input, work_dir)
            .await
            .inspect_err(|e| {
                if matches!(e, CompositorError::Timeout { .. }) {
                    metrics::COMPOSITOR_TIMEOUTS.inc();
                }
            })?;
        Self::observe_phase(JobPhase::Compositing, phase_start);

        let sides = match &export.scratch {
            Some(scratch) => {
                builder.merge_scratch(scratch);
                let specs = scratch.side_specs();
                if specs.is_empty() {
                    builder.add_warning(
                        codes::DEFAULT_SIDES,
                        "Scratch metadata declared no usable sides, assuming front and back",
                    );
                    default_sides()
                } else {
                    specs
                }
            }
            None => {
                builder.add_warning(
                    codes::SCRATCH_MISSING,
                    "Compositor wrote no scratch metadata, assuming front and back",
                );
                default_sides()
            }
        };

        // Phases 2 and 3, per side. A side failure is recorded and the
        // remaining sides still run.
        let mut failed_sides = 0;
        for spec in &sides {
            match self
                .run_side(job_id, spec, work_dir, results_dir, &mut builder)
                .await
            {
                Ok(()) => builder.add_side(SideReport {
                    side: spec.side,
                    index: spec.index,
                    finishes: spec.finishes.clone(),
                    die: spec.die,
                    status: SideStatus::Ok,
                    error: None,
                }),
                Err(message) => {
                    failed_sides += 1;
                    metrics::SIDE_FAILURES
                        .with_label_values(&[spec.side.as_str()])
                        .inc();
                    builder.add_warning(
                        codes::SIDE_FAILED,
                        format!("{} layer {}: {}", spec.side, spec.index, message),
                    );
                    builder.add_side(SideReport {
                        side: spec.side,
                        index: spec.index,
                        finishes: spec.finishes.clone(),
                        die: spec.die,
                        status: SideStatus::Failed,
                        error: Some(message),
                    });
                }
            }
        }
        if failed_sides == sides.len() {
            return Err(PipelineError::AllSidesFailed { count: failed_sides });
        }

        // Phase 4: assembly. Register whatever landed in results keyed
        // by filename stem, cross-check the report against the plates
        // actually on disk, then persist it.
        let phase_start = Instant::now();
        register_results(results_dir, &mut builder).await?;
        let mut report = builder.build();
        for warning in validate_report(&report, results_dir) {
            warn!(job_id, warning, "Report validation");
            report.diagnostics.push(crate::report::Diagnostic {
                level: crate::report::DiagnosticLevel::Warning,
                code: codes::MISSING_OUTPUT.to_string(),
                detail: warning,
            });
        }
        let report_path = results_dir.join("report.json");
        save_report(&report, &report_path).await?;
        Self::observe_phase(JobPhase::Assembling, phase_start);

        Ok(JobOutcome {
            job_id: job_id.to_string(),
            report,
            results_dir: results_dir.to_path_buf(),
            report_path,
            elapsed: started.elapsed(),
        })
    }

    /// Separates one side and, when declared, extracts its die line.
    /// Returns a failure message instead of an error type because the
    /// caller only records it.
    async fn run_side(
        &self,
        job_id: &str,
        spec: &SideSpec,
        work_dir: &Path,
        results_dir: &Path,
        builder: &mut ReportBuilder,
    ) -> Result<(), String> {
        let pdf = Self::side_pdf(work_dir, spec);
        if !pdf.exists() {
            return Err(format!("side PDF {} was not produced", pdf.display()));
        }

        let phase_start = Instant::now();
        let separation = self
            .separator
            .separate(job_id, &pdf, work_dir, results_dir, spec.side, spec.index)
            .await
            .map_err(|e| e.to_string())?;
        Self::observe_phase(JobPhase::Separating, phase_start);

        builder.set_plates_detected(spec.side, spec.index, separation.plates_detected.clone());
        for merge in &separation.merges {
            builder.add_warning(
                codes::MULTI_SOURCE_MERGED,
                format!(
                    "{} layer {}: inks {:?} merged into '{}', last one wins",
                    spec.side, spec.index, merge.inks, merge.finish
                ),
            );
        }
        for ink in &separation.empty {
            builder.add_info(
                codes::EMPTY_PLATE_DROPPED,
                format!("{} layer {}: ink '{}' carried no pixels", spec.side, spec.index, ink),
            );
        }
        for ink in &separation.unclassified {
            builder.add_info(
                codes::UNKNOWN_INK,
                format!("{} layer {}: ink '{}' matched no channel", spec.side, spec.index, ink),
            );
        }
        for (finish, path) in &separation.converted {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                let stem = filename
                    .trim_end_matches(&format!(".{}", finish.extension()))
                    .to_string();
                builder.add_output(stem, filename.to_string());
                metrics::PLATES_WRITTEN
                    .with_label_values(&[finish.as_str()])
                    .inc();
            }
        }

        let wants_die = spec.declared_finishes().contains(&Finish::DiecutSvg);
        if wants_die {
            let phase_start = Instant::now();
            self.extract_die(job_id, spec, &pdf, work_dir, results_dir, &separation, builder)
                .await;
            Self::observe_phase(JobPhase::ExtractingDie, phase_start);
        }
        Ok(())
    }

    /// Die extraction is best-effort: any failure downgrades to a
    /// diagnostic and the raster mask ships alone. A die SVG already
    /// exported by the compositor (`{side}_{index}_die.svg` in the
    /// working directory) takes precedence over a fresh extraction.
    async fn extract_die(
        &self,
        job_id: &str,
        spec: &SideSpec,
        pdf: &Path,
        work_dir: &Path,
        results_dir: &Path,
        separation: &crate::separator::SeparationSet,
        builder: &mut ReportBuilder,
    ) {
        let filename = output_filename(spec.side, spec.index, Finish::DiecutSvg);
        let dest = results_dir.join(&filename);

        let exported = work_dir.join(format!("{}_{}_die.svg", spec.side, spec.index));
        let view_box = if is_nonempty_file(&exported).await {
            match promote_die(&exported, &dest).await {
                Ok(view_box) => {
                    info!(job_id, svg = %exported.display(), "Using compositor die line");
                    view_box
                }
                Err(e) => {
                    warn!(job_id, error = %e, "Could not promote compositor die line");
                    builder.add_warning(
                        codes::DIE_VECTOR_UNAVAILABLE,
                        format!("{} layer {}: {}", spec.side, spec.index, e),
                    );
                    return;
                }
            }
        } else {
            match self.vector.extract(job_id, pdf, &dest).await {
                Ok(die) => die.view_box,
                Err(e) => {
                    warn!(job_id, error = %e, "Die line extraction failed");
                    builder.add_warning(
                        codes::DIE_VECTOR_UNAVAILABLE,
                        format!("{} layer {}: {}", spec.side, spec.index, e),
                    );
                    return;
                }
            }
        };
        let stem = filename.trim_end_matches(".svg").to_string();
        builder.add_output(stem, filename);
        metrics::PLATES_WRITTEN
            .with_label_values(&[Finish::DiecutSvg.as_str()])
            .inc();

        let Some(mask) = separation.output_path(Finish::DiecutMask) else {
            return;
        };
        let bounds = match self.raster.content_bounds(mask).await {
            Ok(Some(bounds)) => bounds,
            Ok(None) => return,
            Err(e) => {
                warn!(job_id, error = %e, "Could not measure die mask");
                return;
            }
        };
        if let Some(drift) = check_alignment(view_box, &bounds, self.plate_dpi) {
            if drift > self.alignment_tolerance_px {
                builder.add_warning(
                    codes::DIE_MISALIGNED,
                    format!(
                        "{} layer {}: die drifts {:.1}px from raster mask (tolerance {:.1}px)",
                        spec.side, spec.index, drift, self.alignment_tolerance_px
                    ),
                );
            }
        }
    }

    /// Preserves a failed job for inspection: the uploaded design, a
    /// snapshot of the working directory, and the error itself.
    async fn archive_failure(&self, job_id: &str, input: &Path, work_dir: &Path, message: &str) {
        let archive = self.jobs.failed().join(job_id);
        if let Err(e) = tokio::fs::create_dir_all(&archive).await {
            error!(job_id, error = %e, "Could not create failure archive");
            return;
        }
        if input.exists() {
            if let Some(name) = input.file_name() {
                if let Err(e) = tokio::fs::copy(input, archive.join(name)).await {
                    warn!(job_id, error = %e, "Could not archive input");
                }
            }
        }
        if work_dir.exists() {
            if let Err(e) = copy_dir(work_dir, &archive.join("working")).await {
                warn!(job_id, error = %e, "Could not archive working directory");
            }
        }
        if let Err(e) = ErrorReport::new(job_id, message)
            .save(&archive.join("error.json"))
            .await
        {
            error!(job_id, error = %e, "Could not write error report");
        }
    }

    /// Removes intermediates. Cleanup failures are logged, never raised;
    /// the job's fate is already decided.
    async fn cleanup(&self, job_id: &str, input: &Path, work_dir: &Path) {
        if let Err(e) = tokio::fs::remove_dir_all(work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(job_id, error = %e, "Could not remove working directory");
            }
        }
        if input.exists() {
            if let Err(e) = tokio::fs::remove_file(input).await {
                warn!(job_id, error = %e, "Could not remove input");
            }
        }
    }

    fn observe_phase(phase: JobPhase, start: Instant) {
        metrics::PHASE_DURATION
            .with_label_values(&[phase.as_str()])
            .observe(start.elapsed().as_secs_f64());
    }
}

async fn is_nonempty_file(path: &Path) -> bool {
    matches!(tokio::fs::metadata(path).await, Ok(meta) if meta.is_file() && meta.len() > 0)
}

/// Copies a compositor-exported die SVG into results and reads its
/// viewBox for the alignment check.
async fn promote_die(src: &Path, dest: &Path) -> std::io::Result<Option<[f64; 4]>> {
    tokio::fs::copy(src, dest).await?;
    let svg = tokio::fs::read_to_string(dest).await?;
    Ok(parse_view_box(&svg))
}

/// Keys every plate file already sitting in the results directory into
/// the output map by its filename stem, whichever phase produced it.
async fn register_results(
    results_dir: &Path,
    builder: &mut ReportBuilder,
) -> std::io::Result<()> {
    let mut entries = tokio::fs::read_dir(results_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some((stem, ext)) = name.rsplit_once('.') else { continue };
        if ext != "png" && ext != "svg" {
            continue;
        }
        builder.add_output(stem.to_string(), name.to_string());
    }
    Ok(())
}

/// Recursive directory copy, run on the blocking pool.
async fn copy_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut stack = vec![(src, dest)];
        while let Some((from, to)) = stack.pop() {
            std::fs::create_dir_all(&to)?;
            for entry in std::fs::read_dir(&from)? {
                let entry = entry?;
                let target = to.join(entry.file_name());
                if entry.file_type()?.is_dir() {
                    stack.push((entry.path(), target));
                } else {
                    std::fs::copy(entry.path(), target)?;
                }
            }
        }
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}
