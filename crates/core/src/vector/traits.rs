use super::error::VectorError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Extracted die line plus whatever geometry could be read from it.
#[derive(Debug, Clone)]
pub struct ExtractedDie {
    pub path: PathBuf,

    /// SVG viewBox as [min-x, min-y, width, height] in points, when the
    /// output declares one.
    pub view_box: Option<[f64; 4]>,
}

#[async_trait]
pub trait VectorExtractor: Send + Sync {
    fn name(&self) -> &str;

    /// Converts the side's PDF into an SVG die line at `dest`.
    async fn extract(
        &self,
        job_id: &str,
        pdf: &Path,
        dest: &Path,
    ) -> Result<ExtractedDie, VectorError>;

    /// Cheap availability probe for health reporting.
    async fn validate(&self) -> Result<(), VectorError>;
}
