use crate::vector::{ExtractedDie, VectorError, VectorExtractor};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Scripted vector extractor.
#[derive(Default)]
pub struct MockVectorExtractor {
    fail: Arc<RwLock<bool>>,
    view_box: Arc<RwLock<Option<[f64; 4]>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockVectorExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail(&self) {
        *self.fail.write().await = true;
    }

    pub async fn set_view_box(&self, view_box: [f64; 4]) {
        *self.view_box.write().await = Some(view_box);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl VectorExtractor for MockVectorExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(
        &self,
        job_id: &str,
        _pdf: &Path,
        dest: &Path,
    ) -> Result<ExtractedDie, VectorError> {
        self.calls.write().await.push(job_id.to_string());
        if *self.fail.read().await {
            return Err(VectorError::ToolFailed {
                status: 1,
                stderr: "scripted failure".to_string(),
            });
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, b"<svg/>").await?;
        Ok(ExtractedDie {
            path: dest.to_path_buf(),
            view_box: *self.view_box.read().await,
        })
    }

    async fn validate(&self) -> Result<(), VectorError> {
        Ok(())
    }
}
