//! API integration tests over the in-process router.

mod common;

use axum::http::StatusCode;
use common::{TestFixture, TEST_KEY};
use platesmith_core::{
    compositor::{ScratchMetadata, ScratchSide},
    Finish, Side,
};

fn one_sided_scratch() -> ScratchMetadata {
    ScratchMetadata {
        illustrator: None,
        artboards: Vec::new(),
        sides: vec![ScratchSide {
            side: "front".to_string(),
            index: 0,
            finishes: vec!["foil".to_string()],
            die: false,
        }],
        warnings: Vec::new(),
        errors: Vec::new(),
    }
}

#[tokio::test]
async fn test_ping() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/ping").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert!(!body["timestamp"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_reports_components() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_config_redacts_shared_key() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/config").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["auth"]["shared_key"], "***");
    assert!(!String::from_utf8_lossy(&response.body).contains(TEST_KEY));
}

#[tokio::test]
async fn test_parse_requires_key() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_parse(None, "design.ai", b"%!PS").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = fixture.post_parse(Some("wrong-key"), "design.ai", b"%!PS").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "unauthorized");
}

#[tokio::test]
async fn test_parse_rejects_non_ai_uploads() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post_parse(Some(TEST_KEY), "design.pdf", b"%PDF-1.7")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_file_type");
}

#[tokio::test]
async fn test_parse_runs_a_job_and_returns_the_report() {
    let fixture = TestFixture::new().await;
    fixture.compositor.set_scratch(one_sided_scratch()).await;
    fixture.compositor.add_side_pdf(Side::Front, 0).await;
    fixture
        .separator
        .set_finishes(vec![Finish::Albedo, Finish::Foil])
        .await;

    let response = fixture
        .post_parse(Some(TEST_KEY), "design.ai", b"%!PS-Adobe mock")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get("content-type").unwrap(),
        "application/json"
    );
    let body = response.json();
    let job_id = body["jobId"].as_str().unwrap();
    assert!(!job_id.is_empty());
    assert!(body["outputs"]
        .as_object()
        .unwrap()
        .contains_key("front_layer_0_foil"));
    assert_eq!(body["sides"][0]["status"], "ok");

    // The report on disk is what the endpoint returned.
    let persisted = tokio::fs::read(
        fixture
            .state
            .config()
            .jobs
            .results()
            .join(job_id)
            .join("report.json"),
    )
    .await
    .unwrap();
    assert_eq!(persisted, response.body);
}

#[tokio::test]
async fn test_parse_while_busy_returns_conflict() {
    let fixture = TestFixture::new().await;
    let _permit = fixture.state.admission().try_acquire().unwrap();

    let response = fixture
        .post_parse(Some(TEST_KEY), "design.ai", b"%!PS")
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "busy");
}

#[tokio::test]
async fn test_parse_failure_reports_the_job_id() {
    let fixture = TestFixture::new().await;
    fixture.compositor.set_error("cannot open document").await;

    let response = fixture
        .post_parse(Some(TEST_KEY), "design.ai", b"%!PS")
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("cannot open document"));
    assert!(!body["jobId"].as_str().unwrap().is_empty());

    // The failure was archived, input stored under its sanitized
    // upload name prefixed with the job id.
    let job_id = body["jobId"].as_str().unwrap();
    let archive = fixture.state.config().jobs.failed().join(job_id);
    assert!(archive.join("error.json").exists());
    assert!(archive.join(format!("{}__design.ai", job_id)).exists());
}

#[tokio::test]
async fn test_public_assets_serve_whitelisted_files() {
    let fixture = TestFixture::new().await;
    fixture
        .stage_result("job1", "front_layer_0_foil.png", b"png bytes")
        .await;

    let response = fixture.get("/assets/job1/front_layer_0_foil.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers.get("cache-control").unwrap(),
        "public, max-age=31536000, immutable"
    );
    assert_eq!(response.body, b"png bytes");
}

#[tokio::test]
async fn test_public_assets_reject_other_extensions() {
    let fixture = TestFixture::new().await;
    fixture.stage_result("job1", "notes.txt", b"secret").await;

    let response = fixture.get("/assets/job1/notes.txt").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assets_reject_traversal() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/assets/../working/file.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = fixture.get("/assets/job1/..%2F..%2Fconfig.json").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_asset_is_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/assets/nope/front_layer_0_foil.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_internal_assets_are_key_gated() {
    let fixture = TestFixture::new().await;
    fixture.stage_result("job1", "notes.txt", b"internal").await;

    let response = fixture.get("/internal/assets/job1/notes.txt").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = fixture
        .get_with_key("/internal/assets/job1/notes.txt", TEST_KEY)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"internal");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/ping").await;
    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&response.body).contains("platesmith_http_requests_total"));
}
