//! Illustrator-based compositor implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::sentinel::{self, JobDescription};

use super::config::CompositorConfig;
use super::error::CompositorError;
use super::traits::Compositor;
use super::types::{load_scratch, ExportOutcome};

/// Compositor implementation driving Adobe Illustrator through an export
/// script and sentinel files.
pub struct IllustratorCompositor {
    config: CompositorConfig,
}

impl IllustratorCompositor {
    /// Creates a new compositor with the given configuration.
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    /// Creates a compositor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CompositorConfig::default())
    }

    fn done_marker(out_dir: &Path, job_id: &str) -> PathBuf {
        out_dir.join(format!("{}_done.txt", job_id))
    }

    fn error_marker(out_dir: &Path, job_id: &str) -> PathBuf {
        out_dir.join(format!("{}_error.json", job_id))
    }

    fn scratch_path(out_dir: &Path, job_id: &str) -> PathBuf {
        out_dir.join(format!("{}_scratch.json", job_id))
    }

    /// Terminates stale application instances. Best effort; a failure to
    /// kill is logged, never fatal.
    async fn kill_stale(&self) {
        let Some((program, args)) = self.config.kill_command.split_first() else {
            return;
        };
        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match timeout(Duration::from_secs(10), result).await {
            Ok(Ok(_)) => {
                debug!("Killed stale compositor instances");
                // Give the OS time to release the singleton GUI resources.
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Ok(Err(e)) => warn!("Could not kill stale compositor: {}", e),
            Err(_) => warn!("Stale-instance kill timed out"),
        }
    }

    /// Waits for the completion sentinel, distinguishing the script's
    /// structured error marker from a silent failure.
    async fn await_completion(
        &self,
        done: &Path,
        error: &Path,
        wait: Duration,
    ) -> Result<(), CompositorError> {
        let deadline = Instant::now() + wait;
        loop {
            if sentinel::file_committed(done).await {
                return Ok(());
            }
            if sentinel::file_committed(error).await {
                let message = sentinel::read_error_marker(error).await;
                return Err(CompositorError::ScriptError { message });
            }
            if Instant::now() >= deadline {
                return Err(CompositorError::MissingSentinel);
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
}

#[async_trait]
impl Compositor for IllustratorCompositor {
    fn name(&self) -> &str {
        "illustrator"
    }

    async fn run_export(
        &self,
        job_id: &str,
        input: &Path,
        out_dir: &Path,
    ) -> Result<ExportOutcome, CompositorError> {
        let start = Instant::now();

        if !input.exists() {
            return Err(CompositorError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        if !self.config.export_script.exists() {
            return Err(CompositorError::ScriptNotFound {
                path: self.config.export_script.clone(),
            });
        }
        tokio::fs::create_dir_all(out_dir).await?;

        let done = Self::done_marker(out_dir, job_id);
        let error = Self::error_marker(out_dir, job_id);

        self.kill_stale().await;
        sentinel::clear_markers(&[&done, &error]).await;

        JobDescription::new(job_id, input, out_dir)
            .write(&self.config.runtime_job_file)
            .await?;
        debug!(job_id, "Wrote runtime job description");

        let mut child = Command::new(&self.config.executable)
            .arg(&self.config.export_script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompositorError::ExecutableNotFound {
                        path: self.config.executable.clone(),
                    }
                } else {
                    CompositorError::Io(e)
                }
            })?;
        info!(job_id, pid = child.id(), "Compositor started");

        let bound = Duration::from_secs(self.config.timeout_secs);
        match timeout(bound, child.wait()).await {
            Ok(Ok(status)) => {
                // GUI exit codes are unreliable; log and move on.
                debug!(job_id, code = ?status.code(), "Compositor process exited");
            }
            Ok(Err(e)) => return Err(CompositorError::Io(e)),
            Err(_) => {
                // Race tolerated in favor of success: the sentinel may
                // have been committed right at the deadline.
                if !sentinel::file_committed(&done).await {
                    let _ = child.kill().await;
                    return Err(CompositorError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    });
                }
            }
        }

        let grace = Duration::from_secs(self.config.sentinel_grace_secs);
        self.await_completion(&done, &error, grace).await?;
        sentinel::clear_markers(&[&done, &error]).await;

        let scratch = load_scratch(&Self::scratch_path(out_dir, job_id)).await;
        if scratch.is_none() {
            warn!(job_id, "No scratch metadata from export script");
        }

        let elapsed = start.elapsed();
        info!(job_id, elapsed_ms = elapsed.as_millis() as u64, "Export completed");
        Ok(ExportOutcome { scratch, elapsed })
    }

    async fn validate(&self) -> Result<(), CompositorError> {
        if !self.config.executable.exists() {
            return Err(CompositorError::ExecutableNotFound {
                path: self.config.executable.clone(),
            });
        }
        if !self.config.export_script.exists() {
            return Err(CompositorError::ScriptNotFound {
                path: self.config.export_script.clone(),
            });
        }
        Ok(())
    }
}
