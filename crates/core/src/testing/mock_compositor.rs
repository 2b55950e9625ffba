use crate::compositor::{Compositor, CompositorError, ExportOutcome, ScratchMetadata};
use crate::plate::Side;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Scripted compositor. Writes the side PDFs it was told to and
/// returns the scripted scratch metadata or failure.
#[derive(Default)]
pub struct MockCompositor {
    scratch: Arc<RwLock<Option<ScratchMetadata>>>,
    error_message: Arc<RwLock<Option<String>>>,
    timeout: Arc<RwLock<bool>>,
    side_pdfs: Arc<RwLock<Vec<(Side, u32)>>>,
    die_svgs: Arc<RwLock<Vec<(Side, u32, String)>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_scratch(&self, scratch: ScratchMetadata) {
        *self.scratch.write().await = Some(scratch);
    }

    /// Scripts a script-reported failure.
    pub async fn set_error(&self, message: impl Into<String>) {
        *self.error_message.write().await = Some(message.into());
    }

    /// Scripts a timeout.
    pub async fn set_timeout(&self) {
        *self.timeout.write().await = true;
    }

    /// Adds a side PDF the mock will write into the working directory.
    pub async fn add_side_pdf(&self, side: Side, index: u32) {
        self.side_pdfs.write().await.push((side, index));
    }

    /// Adds a die SVG the mock will export next to the side PDFs.
    pub async fn add_die_svg(&self, side: Side, index: u32, svg: impl Into<String>) {
        self.die_svgs.write().await.push((side, index, svg.into()));
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Compositor for MockCompositor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run_export(
        &self,
        job_id: &str,
        _input: &Path,
        out_dir: &Path,
    ) -> Result<ExportOutcome, CompositorError> {
        self.calls.write().await.push(job_id.to_string());

        if *self.timeout.read().await {
            return Err(CompositorError::Timeout { timeout_secs: 480 });
        }
        if let Some(message) = self.error_message.read().await.clone() {
            return Err(CompositorError::ScriptError { message });
        }

        tokio::fs::create_dir_all(out_dir).await?;
        for (side, index) in self.side_pdfs.read().await.iter() {
            let path = out_dir.join(format!("{}_{}.pdf", side, index));
            tokio::fs::write(&path, b"%PDF-1.7 mock").await?;
        }
        for (side, index, svg) in self.die_svgs.read().await.iter() {
            let path = out_dir.join(format!("{}_{}_die.svg", side, index));
            tokio::fs::write(&path, svg.as_bytes()).await?;
        }

        Ok(ExportOutcome {
            scratch: self.scratch.read().await.clone(),
            elapsed: Duration::from_millis(5),
        })
    }

    async fn validate(&self) -> Result<(), CompositorError> {
        Ok(())
    }
}
