use crate::raster::{ContentBounds, RasterError, RasterOps};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Scripted raster operations. Writes placeholder files instead of
/// real pixels and answers measurements from its script.
pub struct MockRasterOps {
    pixel_count: Arc<RwLock<u64>>,
    bounds: Arc<RwLock<Option<ContentBounds>>>,
    converted: Arc<RwLock<Vec<PathBuf>>>,
}

impl Default for MockRasterOps {
    fn default() -> Self {
        Self {
            pixel_count: Arc::new(RwLock::new(100)),
            bounds: Arc::new(RwLock::new(None)),
            converted: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl MockRasterOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_pixel_count(&self, count: u64) {
        *self.pixel_count.write().await = count;
    }

    pub async fn set_bounds(&self, bounds: ContentBounds) {
        *self.bounds.write().await = Some(bounds);
    }

    pub async fn converted(&self) -> Vec<PathBuf> {
        self.converted.read().await.clone()
    }
}

#[async_trait]
impl RasterOps for MockRasterOps {
    async fn convert_to_png(&self, _src: &Path, dest: &Path) -> Result<(), RasterError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, b"mock png").await?;
        self.converted.write().await.push(dest.to_path_buf());
        Ok(())
    }

    async fn composite_process(
        &self,
        separations: &[PathBuf],
        dest: &Path,
    ) -> Result<(), RasterError> {
        if separations.len() != 4 {
            return Err(RasterError::IncompleteProcessSet {
                got: separations.len(),
            });
        }
        tokio::fs::write(dest, b"mock albedo").await?;
        Ok(())
    }

    async fn non_background_pixels(&self, _path: &Path) -> Result<u64, RasterError> {
        Ok(*self.pixel_count.read().await)
    }

    async fn content_bounds(&self, _path: &Path) -> Result<Option<ContentBounds>, RasterError> {
        Ok(*self.bounds.read().await)
    }
}
