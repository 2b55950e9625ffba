//! Configuration for the compositor adapter.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the Illustrator-based compositor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositorConfig {
    /// Path to the design application executable.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Export script handed to the application on launch.
    #[serde(default = "default_export_script")]
    pub export_script: PathBuf,

    /// Runtime job description file read by the export script.
    #[serde(default = "default_runtime_job_file")]
    pub runtime_job_file: PathBuf,

    /// Overall export timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra time allowed for the sentinel to appear after the process
    /// exits. The script flushes its markers after the GUI returns.
    #[serde(default = "default_sentinel_grace")]
    pub sentinel_grace_secs: u64,

    /// Command used to terminate stale application instances before a
    /// launch. Empty disables the kill step.
    #[serde(default = "default_kill_command")]
    pub kill_command: Vec<String>,
}

fn default_executable() -> PathBuf {
    PathBuf::from(
        r"C:\Program Files\Adobe\Adobe Illustrator 2025\Support Files\Contents\Windows\Illustrator.exe",
    )
}

fn default_export_script() -> PathBuf {
    PathBuf::from("scripts/jsx/export_to_pdf.jsx")
}

fn default_runtime_job_file() -> PathBuf {
    PathBuf::from("scripts/runtime/job.jsx")
}

fn default_timeout() -> u64 {
    480 // 8 minutes
}

fn default_sentinel_grace() -> u64 {
    30
}

fn default_kill_command() -> Vec<String> {
    vec![
        "powershell".to_string(),
        "-NoProfile".to_string(),
        "-Command".to_string(),
        "Get-Process -Name Illustrator -ErrorAction SilentlyContinue | Stop-Process -Force"
            .to_string(),
    ]
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            export_script: default_export_script(),
            runtime_job_file: default_runtime_job_file(),
            timeout_secs: default_timeout(),
            sentinel_grace_secs: default_sentinel_grace(),
            kill_command: default_kill_command(),
        }
    }
}

impl CompositorConfig {
    /// Creates a config with a custom executable path.
    pub fn with_executable(executable: PathBuf) -> Self {
        Self {
            executable,
            ..Default::default()
        }
    }

    /// Sets the export timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Disables the stale-instance kill step.
    pub fn without_kill(mut self) -> Self {
        self.kill_command = Vec::new();
        self
    }
}
