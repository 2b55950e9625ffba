use platesmith_core::{
    compositor::Compositor, pipeline::AdmissionLock, separator::Separator,
    vector::VectorExtractor, Config, JobPipeline, SanitizedConfig,
};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<JobPipeline>,
    admission: AdmissionLock,
    compositor: Arc<dyn Compositor>,
    separator: Arc<dyn Separator>,
    vector: Arc<dyn VectorExtractor>,
}

impl AppState {
    pub fn new(
        config: Config,
        pipeline: Arc<JobPipeline>,
        compositor: Arc<dyn Compositor>,
        separator: Arc<dyn Separator>,
        vector: Arc<dyn VectorExtractor>,
    ) -> Self {
        Self {
            config,
            pipeline,
            admission: AdmissionLock::new(),
            compositor,
            separator,
            vector,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &JobPipeline {
        &self.pipeline
    }

    pub fn admission(&self) -> &AdmissionLock {
        &self.admission
    }

    pub fn compositor(&self) -> &dyn Compositor {
        self.compositor.as_ref()
    }

    pub fn separator(&self) -> &dyn Separator {
        self.separator.as_ref()
    }

    pub fn vector(&self) -> &dyn VectorExtractor {
        self.vector.as_ref()
    }

    /// Constant-time-ish shared key check. Keys are long random strings;
    /// a length mismatch alone rejects.
    pub fn key_matches(&self, presented: &str) -> bool {
        let expected = self.config.auth.shared_key.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
