//! Error types for the compositor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving the external design application.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// Application executable not found.
    #[error("Compositor executable not found at path: {path}")]
    ExecutableNotFound { path: PathBuf },

    /// Export script not found.
    #[error("Export script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// Input document not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Export exceeded the configured bound.
    #[error("Compositor timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The export script reported a structured error.
    #[error("Compositor script error: {message}")]
    ScriptError { message: String },

    /// The process finished but never committed a completion marker.
    #[error("Compositor did not write a completion sentinel")]
    MissingSentinel,

    /// I/O error during the export protocol.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompositorError {
    /// Whether the caller may retry the job with a fresh id.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
