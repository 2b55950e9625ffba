use super::error::SeparatorError;
use super::types::SeparationSet;
use crate::plate::Side;
use async_trait::async_trait;
use std::path::Path;

/// Splits a flattened per-side PDF into finish plates.
#[async_trait]
pub trait Separator: Send + Sync {
    fn name(&self) -> &str;

    /// Separates `pdf` for one side and layer. Intermediate plates land
    /// under `work_dir`; final named plates are written to `out_dir`.
    async fn separate(
        &self,
        job_id: &str,
        pdf: &Path,
        work_dir: &Path,
        out_dir: &Path,
        side: Side,
        layer_index: u32,
    ) -> Result<SeparationSet, SeparatorError>;

    /// Cheap availability probe for health reporting.
    async fn validate(&self) -> Result<(), SeparatorError>;
}
