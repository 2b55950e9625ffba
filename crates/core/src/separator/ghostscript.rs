use super::config::SeparatorConfig;
use super::error::SeparatorError;
use super::traits::Separator;
use super::types::{MergeRecord, SeparationSet};
use crate::plate::{output_filename, Finish, Side};
use crate::raster::RasterOps;
use async_trait::async_trait;
use regex_lite::Regex;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Process inks, in composite order.
const PROCESS_INKS: [&str; 4] = ["Cyan", "Magenta", "Yellow", "Black"];

const VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Ghostscript-backed separator. Runs the tiffsep device, which writes
/// one grayscale TIFF per ink named `plates(<Ink>).tif`, then classifies
/// and converts the plates it finds.
pub struct GhostscriptSeparator {
    config: SeparatorConfig,
    raster: Arc<dyn RasterOps>,
}

impl GhostscriptSeparator {
    pub fn new(config: SeparatorConfig, raster: Arc<dyn RasterOps>) -> Self {
        Self { config, raster }
    }

    fn plates_dir(work_dir: &Path, job_id: &str) -> PathBuf {
        work_dir.join(format!("{}__plates", job_id))
    }

    async fn run_tool(&self, pdf: &Path, plates_dir: &Path) -> Result<(), SeparatorError> {
        let output_template = plates_dir.join("plates.tif");
        let mut command = Command::new(&self.config.executable);
        command
            .arg("-dNOPAUSE")
            .arg("-dBATCH")
            .arg("-dSAFER")
            .arg(format!("-sDEVICE={}", self.config.device))
            .arg(format!("-r{}", self.config.plate_dpi))
            .arg(format!("-sOutputFile={}", output_template.display()))
            .arg(pdf)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(executable = %self.config.executable, pdf = %pdf.display(), "Running separator");

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SeparatorError::ExecutableNotFound {
                    path: self.config.executable.clone(),
                }
            } else {
                SeparatorError::Io(e)
            }
        })?;

        let mut stderr_pipe = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                let _ = pipe.read_to_string(&mut buf).await;
            }
            buf
        });

        let bound = Duration::from_secs(self.config.timeout_secs);
        let status = match timeout(bound, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(SeparatorError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();
        if !status.success() {
            return Err(SeparatorError::ToolFailed {
                status: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    /// Enumerates separation TIFFs as (ink name, path), sorted by
    /// filename. The parenthesis-free composite TIFF is skipped.
    async fn enumerate_plates(
        plates_dir: &Path,
    ) -> Result<Vec<(String, PathBuf)>, SeparatorError> {
        let ink_pattern = Regex::new(r"\(([^)]+)\)\.tif$").unwrap();
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(plates_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(captures) = ink_pattern.captures(name) {
                entries.push((captures[1].to_string(), path.clone()));
            }
        }
        entries.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
        Ok(entries)
    }
}

#[async_trait]
impl Separator for GhostscriptSeparator {
    fn name(&self) -> &str {
        "ghostscript"
    }

    async fn separate(
        &self,
        job_id: &str,
        pdf: &Path,
        work_dir: &Path,
        out_dir: &Path,
        side: Side,
        layer_index: u32,
    ) -> Result<SeparationSet, SeparatorError> {
        if !pdf.exists() {
            return Err(SeparatorError::InputNotFound {
                path: pdf.to_path_buf(),
            });
        }

        let plates_dir = Self::plates_dir(work_dir, job_id);
        tokio::fs::create_dir_all(&plates_dir).await?;
        tokio::fs::create_dir_all(out_dir).await?;

        self.run_tool(pdf, &plates_dir).await?;

        let plates = Self::enumerate_plates(&plates_dir).await?;
        if plates.is_empty() {
            return Err(SeparatorError::NoPlates { dir: plates_dir });
        }

        let mut set = SeparationSet {
            plates_detected: plates.iter().map(|(ink, _)| ink.clone()).collect(),
            ..Default::default()
        };

        let mut process: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut channel_inks: BTreeMap<Finish, Vec<String>> = BTreeMap::new();
        let mut winners: BTreeMap<Finish, PathBuf> = BTreeMap::new();

        for (ink, path) in &plates {
            if PROCESS_INKS.contains(&ink.as_str()) {
                process.insert(ink.clone(), path.clone());
                continue;
            }
            let Some(finish) = self.config.tokens.classify(ink) else {
                warn!(job_id, ink, "Spot ink matched no finish token, skipping");
                set.unclassified.push(ink.clone());
                continue;
            };
            let pixels = self.raster.non_background_pixels(path).await?;
            if pixels < self.config.min_plate_pixels {
                debug!(job_id, ink, pixels, "Dropping empty plate");
                set.empty.push(ink.clone());
                continue;
            }
            channel_inks.entry(finish).or_default().push(ink.clone());
            // Lexicographically last ink wins the channel.
            winners.insert(finish, path.clone());
        }

        for (finish, inks) in &channel_inks {
            if inks.len() > 1 {
                set.merges.push(MergeRecord {
                    finish: *finish,
                    inks: inks.clone(),
                });
            }
        }

        for (finish, plate) in &winners {
            let dest = out_dir.join(output_filename(side, layer_index, *finish));
            self.raster.convert_to_png(plate, &dest).await?;
            set.converted.insert(*finish, dest);
        }

        if PROCESS_INKS.iter().all(|ink| process.contains_key(*ink)) {
            let cmyk: Vec<PathBuf> = PROCESS_INKS
                .iter()
                .map(|ink| process[*ink].clone())
                .collect();
            let dest = out_dir.join(output_filename(side, layer_index, Finish::Albedo));
            self.raster.composite_process(&cmyk, &dest).await?;
            set.converted.insert(Finish::Albedo, dest);
        } else if !process.is_empty() {
            warn!(
                job_id,
                got = process.len(),
                "Incomplete process plate set, skipping albedo"
            );
        }

        info!(
            job_id,
            side = %side,
            plates = set.plates_detected.len(),
            converted = set.converted.len(),
            "Separation complete"
        );
        Ok(set)
    }

    async fn validate(&self) -> Result<(), SeparatorError> {
        let mut command = Command::new(&self.config.executable);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let mut child = command.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SeparatorError::ExecutableNotFound {
                    path: self.config.executable.clone(),
                }
            } else {
                SeparatorError::Io(e)
            }
        })?;
        let status = match timeout(VALIDATE_TIMEOUT, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(SeparatorError::Timeout { timeout_secs: 10 });
            }
        };
        if !status.success() {
            return Err(SeparatorError::ToolFailed {
                status: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}
