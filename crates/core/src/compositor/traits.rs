//! Trait definitions for the compositor module.

use async_trait::async_trait;
use std::path::Path;

use super::error::CompositorError;
use super::types::ExportOutcome;

/// Drives the external design application to produce a paginated export
/// and scratch metadata for one job.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Returns the name of this compositor implementation.
    fn name(&self) -> &str;

    /// Runs the export for a job.
    ///
    /// Success is determined solely by the completion sentinel, never by
    /// the process exit code. On success the paginated export is in
    /// `out_dir`, and scratch metadata is returned if the script wrote it.
    async fn run_export(
        &self,
        job_id: &str,
        input: &Path,
        out_dir: &Path,
    ) -> Result<ExportOutcome, CompositorError>;

    /// Validates that the compositor is properly configured and ready.
    async fn validate(&self) -> Result<(), CompositorError>;
}
