//! Job asset serving.
//!
//! Results are plain files on disk. The public route serves only the
//! plate formats consumers need and marks them immutable; the internal
//! route is key-gated and unrestricted so operators can pull anything
//! out of a results directory.

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use super::middleware::require_key;
use crate::state::AppState;

/// Extensions the public route will serve.
const PUBLIC_EXTENSIONS: [&str; 3] = ["png", "svg", "json"];

/// Plates never change after a job finishes, so clients may cache
/// forever.
const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// Rejects anything that could escape the results directory.
fn safe_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains('/')
        && !value.contains('\\')
        && !value.contains('\0')
}

fn resolve(state: &AppState, job_id: &str, filename: &str) -> Option<PathBuf> {
    if !safe_component(job_id) || !safe_component(filename) {
        return None;
    }
    let path = state.config().jobs.results().join(job_id).join(filename);
    path.is_file().then_some(path)
}

async fn serve_file(path: PathBuf) -> Response {
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    match tokio::fs::read(&path).await {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime.as_ref().to_string()),
                (header::CACHE_CONTROL, IMMUTABLE_CACHE.to_string()),
            ],
            body,
        )
            .into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "not_found"})),
        )
            .into_response(),
    }
}

/// GET /assets/{job_id}/{filename}. Public, whitelist-only.
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    UrlPath((job_id, filename)): UrlPath<(String, String)>,
) -> Response {
    let allowed = filename
        .rsplit('.')
        .next()
        .map(|ext| PUBLIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);
    if !allowed {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "not_found"})),
        )
            .into_response();
    }
    match resolve(&state, &job_id, &filename) {
        Some(path) => serve_file(path).await,
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "not_found"})),
        )
            .into_response(),
    }
}

/// GET /internal/assets/{job_id}/{filename}. Key-gated, no extension
/// whitelist.
pub async fn get_internal_asset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    UrlPath((job_id, filename)): UrlPath<(String, String)>,
) -> Response {
    if let Err(rejection) = require_key(&state, &headers) {
        return rejection.into_response();
    }
    match resolve(&state, &job_id, &filename) {
        Some(path) => serve_file(path).await,
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "not_found"})),
        )
            .into_response(),
    }
}
