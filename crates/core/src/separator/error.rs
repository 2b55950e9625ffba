use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeparatorError {
    #[error("Separator executable not found: {path}")]
    ExecutableNotFound { path: String },

    #[error("Input PDF not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Separation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Separator exited with status {status}: {stderr}")]
    ToolFailed { status: i32, stderr: String },

    #[error("Separation produced no plates in {dir}")]
    NoPlates { dir: PathBuf },

    #[error("Raster error: {0}")]
    Raster(#[from] crate::raster::RasterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeparatorError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
