//! Common test utilities for in-process API testing with mocks.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use platesmith_core::{
    testing::{MockCompositor, MockRasterOps, MockSeparator, MockVectorExtractor},
    Config, JobPipeline,
};
use platesmith_server::{api::create_router, state::AppState};

pub const TEST_KEY: &str = "test-shared-key-0123456789";

/// In-process server with scripted adapters.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
    pub compositor: Arc<MockCompositor>,
    pub separator: Arc<MockSeparator>,
    pub vector: Arc<MockVectorExtractor>,
    pub _temp_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body was not JSON")
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.jobs.root = temp_dir.path().join("jobs");
        config.auth.shared_key = TEST_KEY.to_string();
        config.jobs.ensure_directories().expect("job dirs");

        let compositor = Arc::new(MockCompositor::new());
        let separator = Arc::new(MockSeparator::new());
        let vector = Arc::new(MockVectorExtractor::new());
        let raster = Arc::new(MockRasterOps::new());

        let pipeline = Arc::new(JobPipeline::new(
            config.jobs.clone(),
            compositor.clone(),
            separator.clone(),
            vector.clone(),
            raster,
            config.separator.plate_dpi,
            config.vector.alignment_tolerance_px,
        ));

        let state = Arc::new(AppState::new(
            config,
            pipeline,
            compositor.clone(),
            separator.clone(),
            vector.clone(),
        ));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            compositor,
            separator,
            vector,
            _temp_dir: temp_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body read failed")
            .to_bytes()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_key(&self, path: &str, key: &str) -> TestResponse {
        self.send(
            Request::builder()
                .uri(path)
                .header("x-key", key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST /parse with a multipart `file` field.
    pub async fn post_parse(
        &self,
        key: Option<&str>,
        filename: &str,
        content: &[u8],
    ) -> TestResponse {
        let boundary = "platesmith-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/parse")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            );
        if let Some(key) = key {
            builder = builder.header("x-key", key);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Drops a file into a job's results directory.
    pub async fn stage_result(&self, job_id: &str, filename: &str, content: &[u8]) {
        let dir = self.state.config().jobs.results().join(job_id);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(filename), content).await.unwrap();
    }
}
