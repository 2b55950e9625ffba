//! Job report assembly and validation.
//!
//! The report is the single machine-readable account of a job. It is
//! built append-only while the pipeline runs, persisted next to the
//! plates as `report.json`, and returned verbatim by the API.

mod builder;
mod types;
mod validate;

pub use builder::{save_report, ReportBuilder};
pub use types::{
    Diagnostic, DiagnosticLevel, ErrorReport, Report, SideReport, SideStatus,
    REPORT_SCHEMA_VERSION,
};
pub use validate::validate_report;

/// Diagnostic codes emitted by the pipeline.
pub mod codes {
    pub const MULTI_SOURCE_MERGED: &str = "MULTI_SOURCE_MERGED";
    pub const EMPTY_PLATE_DROPPED: &str = "EMPTY_PLATE_DROPPED";
    pub const UNKNOWN_INK: &str = "UNKNOWN_INK";
    pub const SIDE_FAILED: &str = "SIDE_FAILED";
    pub const DEFAULT_SIDES: &str = "DEFAULT_SIDES";
    pub const SCRATCH_MISSING: &str = "SCRATCH_MISSING";
    pub const DIE_VECTOR_UNAVAILABLE: &str = "DIE_VECTOR_UNAVAILABLE";
    pub const DIE_MISALIGNED: &str = "DIE_MISALIGNED";
    pub const MISSING_OUTPUT: &str = "MISSING_OUTPUT";
    pub const COMPOSITOR_WARNING: &str = "COMPOSITOR_WARNING";
}
