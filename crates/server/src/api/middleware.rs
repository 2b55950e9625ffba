//! Shared-key authentication and metrics middleware.

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Header carrying the shared key on protected endpoints.
pub const KEY_HEADER: &str = "x-key";

/// Validates the X-KEY header against the configured shared key.
/// Returns the 401 response body on failure so handlers can return it
/// directly.
pub fn require_key(
    state: &Arc<AppState>,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    let presented = headers.get(KEY_HEADER).and_then(|v| v.to_str().ok());
    match presented {
        None => {
            AUTH_FAILURES_TOTAL.with_label_values(&["missing_key"]).inc();
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "unauthorized"})),
            ))
        }
        Some(key) if !state.key_matches(key) => {
            AUTH_FAILURES_TOTAL.with_label_values(&["invalid_key"]).inc();
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "unauthorized"})),
            ))
        }
        Some(_) => Ok(()),
    }
}

/// Metrics middleware that tracks HTTP request duration and counts.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}
