use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Vector tool not found: {path}")]
    ExecutableNotFound { path: String },

    #[error("Die PDF not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Vector extraction timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Vector tool exited with status {status}: {stderr}")]
    ToolFailed { status: i32, stderr: String },

    #[error("Vector tool produced no SVG at {path}")]
    NoOutput { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
