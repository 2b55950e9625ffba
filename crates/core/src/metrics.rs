//! Prometheus metrics for the extraction pipeline.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

/// Jobs total by result.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("platesmith_jobs_total", "Total extraction jobs"),
        &["result"], // "success", "failed", "rejected_busy"
    )
    .unwrap()
});

/// End-to-end job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "platesmith_job_duration_seconds",
            "Duration of extraction jobs",
        )
        .buckets(vec![5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0]),
        &["result"],
    )
    .unwrap()
});

/// Per-phase duration in seconds.
pub static PHASE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "platesmith_phase_duration_seconds",
            "Duration of pipeline phases",
        )
        .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["phase"], // "compositing", "separating", "extracting_die", "assembling"
    )
    .unwrap()
});

/// Sides that failed while the job as a whole continued.
pub static SIDE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("platesmith_side_failures_total", "Total per-side failures"),
        &["side"],
    )
    .unwrap()
});

/// Plates written to results directories.
pub static PLATES_WRITTEN: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("platesmith_plates_written_total", "Total plates written"),
        &["finish"],
    )
    .unwrap()
});

/// Compositor timeouts.
pub static COMPOSITOR_TIMEOUTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "platesmith_compositor_timeouts_total",
        "Total compositor timeouts",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(PHASE_DURATION.clone()),
        Box::new(SIDE_FAILURES.clone()),
        Box::new(PLATES_WRITTEN.clone()),
        Box::new(COMPOSITOR_TIMEOUTS.clone()),
    ]
}
