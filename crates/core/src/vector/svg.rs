use super::config::VectorConfig;
use super::error::VectorError;
use super::traits::{ExtractedDie, VectorExtractor};
use crate::raster::ContentBounds;
use async_trait::async_trait;
use regex_lite::Regex;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

const VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum drift, in plate pixels, between the SVG geometry and the
/// raster die mask. SVG lengths are points at 72 per inch; the mask is
/// rendered at `dpi`. Returns the larger of the width and height
/// deltas, or None when the SVG declares no viewBox.
pub fn check_alignment(
    view_box: Option<[f64; 4]>,
    mask_bounds: &ContentBounds,
    dpi: u32,
) -> Option<f64> {
    let [_, _, vb_width, vb_height] = view_box?;
    let scale = dpi as f64 / 72.0;
    let dw = (vb_width * scale - mask_bounds.width as f64).abs();
    let dh = (vb_height * scale - mask_bounds.height as f64).abs();
    Some(dw.max(dh))
}

/// Pulls `[x, y, width, height]` out of an SVG's viewBox attribute.
pub fn parse_view_box(svg: &str) -> Option<[f64; 4]> {
    let pattern = Regex::new(r#"viewBox\s*=\s*"([^"]+)""#).unwrap();
    let captures = pattern.captures(svg)?;
    let values: Vec<f64> = captures[1]
        .split_whitespace()
        .filter_map(|v| v.parse().ok())
        .collect();
    match values.as_slice() {
        [x, y, w, h] => Some([*x, *y, *w, *h]),
        _ => None,
    }
}

/// Ghostscript svg-device extractor.
pub struct SvgDieExtractor {
    config: VectorConfig,
}

impl SvgDieExtractor {
    pub fn new(config: VectorConfig) -> Self {
        Self { config }
    }

    fn spawn_error(&self, e: std::io::Error) -> VectorError {
        if e.kind() == ErrorKind::NotFound {
            VectorError::ExecutableNotFound {
                path: self.config.executable.clone(),
            }
        } else {
            VectorError::Io(e)
        }
    }
}

#[async_trait]
impl VectorExtractor for SvgDieExtractor {
    fn name(&self) -> &str {
        "ghostscript-svg"
    }

    async fn extract(
        &self,
        job_id: &str,
        pdf: &Path,
        dest: &Path,
    ) -> Result<ExtractedDie, VectorError> {
        if !pdf.exists() {
            return Err(VectorError::InputNotFound {
                path: pdf.to_path_buf(),
            });
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = Command::new(&self.config.executable);
        command
            .arg("-dNOPAUSE")
            .arg("-dBATCH")
            .arg("-dSAFER")
            .arg(format!("-sDEVICE={}", self.config.device))
            .arg(format!("-sOutputFile={}", dest.display()))
            .arg(pdf)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(job_id, pdf = %pdf.display(), "Extracting die line");

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
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
                return Err(VectorError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();
        if !status.success() {
            return Err(VectorError::ToolFailed {
                status: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }
        if !dest.exists() {
            return Err(VectorError::NoOutput {
                path: dest.to_path_buf(),
            });
        }

        let svg = tokio::fs::read_to_string(dest).await?;
        Ok(ExtractedDie {
            path: dest.to_path_buf(),
            view_box: parse_view_box(&svg),
        })
    }

    async fn validate(&self) -> Result<(), VectorError> {
        let mut command = Command::new(&self.config.executable);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let status = match timeout(VALIDATE_TIMEOUT, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(VectorError::Timeout { timeout_secs: 10 });
            }
        };
        if !status.success() {
            return Err(VectorError::ToolFailed {
                status: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    const SVG_SAMPLE: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 144 72"><path d="M0 0"/></svg>"#;

    #[test]
    fn test_parse_view_box() {
        assert_eq!(parse_view_box(SVG_SAMPLE), Some([0.0, 0.0, 144.0, 72.0]));
        assert_eq!(parse_view_box("<svg></svg>"), None);
    }

    #[test]
    fn test_check_alignment_within_tolerance() {
        // 144pt x 72pt at 600dpi is 1200 x 600 px.
        let bounds = ContentBounds {
            x: 0,
            y: 0,
            width: 1199,
            height: 600,
        };
        let drift = check_alignment(Some([0.0, 0.0, 144.0, 72.0]), &bounds, 600).unwrap();
        assert!(drift <= 2.0, "drift was {}", drift);
    }

    #[test]
    fn test_check_alignment_detects_drift() {
        let bounds = ContentBounds {
            x: 0,
            y: 0,
            width: 1100,
            height: 600,
        };
        let drift = check_alignment(Some([0.0, 0.0, 144.0, 72.0]), &bounds, 600).unwrap();
        assert!(drift > 2.0);
    }

    #[test]
    fn test_check_alignment_without_view_box() {
        let bounds = ContentBounds {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };
        assert!(check_alignment(None, &bounds, 600).is_none());
    }

    #[tokio::test]
    async fn test_extract_missing_input() {
        let dir = TempDir::new().unwrap();
        let extractor = SvgDieExtractor::new(VectorConfig::default());
        let err = extractor
            .extract("j1", &dir.path().join("nope.pdf"), &dir.path().join("d.svg"))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_extract_missing_executable() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("in.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();
        let config = VectorConfig {
            executable: "/nonexistent/gs".to_string(),
            ..Default::default()
        };
        let err = SvgDieExtractor::new(config)
            .extract("j1", &pdf, &dir.path().join("d.svg"))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::ExecutableNotFound { .. }));
    }

    #[tokio::test]
    async fn test_extract_tool_writes_svg() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("in.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();
        let dest = dir.path().join("out").join("die.svg");

        let script = dir.path().join("fake.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nprintf '%s' '{}' > '{}'\n", SVG_SAMPLE, dest.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = VectorConfig {
            executable: script.to_string_lossy().into_owned(),
            timeout_secs: 10,
            ..Default::default()
        };
        let die = SvgDieExtractor::new(config)
            .extract("j1", &pdf, &dest)
            .await
            .unwrap();
        assert_eq!(die.view_box, Some([0.0, 0.0, 144.0, 72.0]));
        assert!(die.path.exists());
    }

    #[tokio::test]
    async fn test_extract_tool_exits_without_output() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("in.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();
        let config = VectorConfig {
            executable: "/bin/true".to_string(),
            timeout_secs: 10,
            ..Default::default()
        };
        let err = SvgDieExtractor::new(config)
            .extract("j1", &pdf, &dir.path().join("die.svg"))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::NoOutput { .. }));
    }
}
