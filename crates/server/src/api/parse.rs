//! Design upload and job execution.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use platesmith_core::metrics::JOBS_TOTAL;

use super::middleware::require_key;
use crate::state::AppState;

/// Keeps the uploaded name recognizable on disk while stripping
/// anything path-like or shell-hostile.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.ai".to_string()
    } else {
        cleaned
    }
}

/// POST /parse. Accepts one `.ai` design as the multipart `file` field,
/// runs the extraction pipeline to completion, and returns the
/// persisted report verbatim. Exactly one job runs at a time; callers
/// that hit a busy server get 409 and should retry later.
pub async fn parse(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(rejection) = require_key(&state, &headers) {
        return rejection.into_response();
    }

    let Some(_permit) = state.admission().try_acquire() else {
        JOBS_TOTAL.with_label_values(&["rejected_busy"]).inc();
        return (StatusCode::CONFLICT, Json(json!({"error": "busy"}))).into_response();
    };

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "missing_file"})),
                )
                    .into_response()
            }
            Err(e) => {
                warn!(error = %e, "Upload aborted");
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({"error": "payload_too_large"})),
                )
                    .into_response();
            }
        }
    };

    let Some(filename) = field.file_name().map(String::from) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "missing_filename"})),
        )
            .into_response();
    };
    if !filename.to_lowercase().ends_with(".ai") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_file_type", "expected": ".ai"})),
        )
            .into_response();
    }

    let body = match field.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Upload aborted mid-field");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({"error": "payload_too_large"})),
            )
                .into_response();
        }
    };
    let max_bytes = state.config().jobs.max_upload_mb * 1024 * 1024;
    if body.len() as u64 > max_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({"error": "payload_too_large", "max_mb": state.config().jobs.max_upload_mb})),
        )
            .into_response();
    }

    let job_id = Uuid::new_v4().simple().to_string();
    info!(job_id, filename, bytes = body.len(), "Job accepted");

    let input = state
        .config()
        .jobs
        .incoming()
        .join(format!("{}__{}", job_id, sanitize_filename(&filename)));
    if let Err(e) = tokio::fs::write(&input, &body).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": true, "message": e.to_string(), "jobId": job_id})),
        )
            .into_response();
    }

    match state.pipeline().run(&job_id, &input).await {
        Ok(outcome) => match tokio::fs::read(&outcome.report_path).await {
            Ok(report) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                report,
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": true, "message": e.to_string(), "jobId": job_id})),
            )
                .into_response(),
        },
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": true, "message": e.to_string(), "jobId": job_id})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("card v2 (final).ai"), "card_v2__final_.ai");
        assert_eq!(sanitize_filename("../../etc/passwd.ai"), "_.._etc_passwd.ai");
        assert_eq!(sanitize_filename("déjà.ai"), "d_j_.ai");
        assert_eq!(sanitize_filename(""), "upload.ai");
    }
}
