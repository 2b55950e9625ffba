//! Filesystem-based synchronous handshake with external processes.
//!
//! The GUI compositor cannot be instrumented in-process, so job parameters
//! travel in a small file we drop before launch, and completion is inferred
//! from marker files the external script commits to disk. Process exit
//! codes are never trusted; the markers are the only protocol.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::warn;

/// Poll interval for sentinel files. Coarse on purpose: the external
/// process writes at human-GUI timescales.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Waits for a file to exist with non-zero size.
///
/// Requiring non-zero size avoids racing the external process between
/// create and write. Returns false on timeout without raising; re-polling
/// after a positive result returns true immediately.
pub async fn await_file(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if file_committed(path).await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Single non-blocking check: present and non-empty.
pub async fn file_committed(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len() > 0,
        Err(_) => false,
    }
}

/// Job parameters handed to the opaque compositor script.
///
/// This file is the sole parameter-passing channel into the external
/// script. Paths are forward-slash normalized regardless of host style
/// because the script's runtime cannot handle backslash escapes reliably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    pub input: String,
    pub output: String,
    pub job_id: String,
}

impl JobDescription {
    pub fn new(job_id: &str, input: &Path, output: &Path) -> Self {
        Self {
            input: normalize_path(input),
            output: normalize_path(output),
            job_id: job_id.to_string(),
        }
    }

    /// Renders the description as the script-side `__JOB` object.
    pub fn to_script_source(&self) -> String {
        format!(
            "var __JOB = {{\n  input: {},\n  output: {},\n  job_id: {}\n}};\n",
            json_string(&self.input),
            json_string(&self.output),
            json_string(&self.job_id),
        )
    }

    /// Writes the runtime job file, creating parent directories as needed.
    pub async fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.to_script_source()).await
    }
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Structured error marker written by the external script.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMarker {
    pub error: ErrorMarkerBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMarkerBody {
    pub message: String,
}

/// Reads an error marker, falling back to a generic message when the
/// marker itself is unreadable or malformed.
pub async fn read_error_marker(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => match serde_json::from_str::<ErrorMarker>(&raw) {
            Ok(marker) => marker.error.message,
            Err(e) => {
                warn!(path = %path.display(), "Malformed error marker: {}", e);
                "Unknown error".to_string()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), "Could not read error marker: {}", e);
            "Unknown error".to_string()
        }
    }
}

/// Removes stale sentinel files from a previous run. Best effort.
pub async fn clear_markers(paths: &[&Path]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), "Could not remove stale sentinel: {}", e),
        }
    }
}
