use crate::compositor::CompositorError;
use thiserror::Error;

/// Job-fatal failures. Per-side and die extraction problems never show
/// up here; they become report diagnostics instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Compositor failed: {0}")]
    Compositor(#[from] CompositorError),

    #[error("All {count} sides failed")]
    AllSidesFailed { count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Compositor(e) => e.is_retryable(),
            Self::AllSidesFailed { .. } => false,
            Self::Io(_) => true,
        }
    }
}
