use crate::plate::{output_filename, Finish, Side};
use crate::separator::{MergeRecord, SeparationSet, Separator, SeparatorError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Scripted separator. Fabricates plate files for the scripted
/// finishes and can be told to fail individual sides.
pub struct MockSeparator {
    fail_sides: Arc<RwLock<HashSet<Side>>>,
    finishes: Arc<RwLock<Vec<Finish>>>,
    plates_detected: Arc<RwLock<Vec<String>>>,
    merges: Arc<RwLock<Vec<MergeRecord>>>,
    calls: Arc<RwLock<Vec<(Side, u32)>>>,
}

impl Default for MockSeparator {
    fn default() -> Self {
        Self {
            fail_sides: Arc::new(RwLock::new(HashSet::new())),
            finishes: Arc::new(RwLock::new(vec![Finish::Albedo])),
            plates_detected: Arc::new(RwLock::new(vec![
                "Cyan".to_string(),
                "Magenta".to_string(),
                "Yellow".to_string(),
                "Black".to_string(),
            ])),
            merges: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl MockSeparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a failure for one side; other sides keep working.
    pub async fn fail_side(&self, side: Side) {
        self.fail_sides.write().await.insert(side);
    }

    /// Sets which finish plates every successful separation yields.
    pub async fn set_finishes(&self, finishes: Vec<Finish>) {
        *self.finishes.write().await = finishes;
    }

    pub async fn set_plates_detected(&self, inks: Vec<String>) {
        *self.plates_detected.write().await = inks;
    }

    pub async fn add_merge(&self, merge: MergeRecord) {
        self.merges.write().await.push(merge);
    }

    pub async fn calls(&self) -> Vec<(Side, u32)> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Separator for MockSeparator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn separate(
        &self,
        _job_id: &str,
        _pdf: &Path,
        _work_dir: &Path,
        out_dir: &Path,
        side: Side,
        layer_index: u32,
    ) -> Result<SeparationSet, SeparatorError> {
        self.calls.write().await.push((side, layer_index));

        if self.fail_sides.read().await.contains(&side) {
            return Err(SeparatorError::ToolFailed {
                status: 1,
                stderr: "scripted failure".to_string(),
            });
        }

        tokio::fs::create_dir_all(out_dir).await?;
        let mut set = SeparationSet {
            plates_detected: self.plates_detected.read().await.clone(),
            merges: self.merges.read().await.clone(),
            ..Default::default()
        };
        for finish in self.finishes.read().await.iter() {
            let path = out_dir.join(output_filename(side, layer_index, *finish));
            tokio::fs::write(&path, b"mock plate").await?;
            set.converted.insert(*finish, path);
        }
        Ok(set)
    }

    async fn validate(&self) -> Result<(), SeparatorError> {
        Ok(())
    }
}
