use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use platesmith_core::SanitizedConfig;

use crate::metrics::encode_metrics;
use crate::state::AppState;

pub async fn ping() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: Vec<ComponentHealth>,
}

/// Probes every external tool. Degraded tools make the whole endpoint
/// report 503 so load balancers stop routing jobs here.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (compositor, separator, vector) = tokio::join!(
        state.compositor().validate(),
        state.separator().validate(),
        state.vector().validate(),
    );

    let components = vec![
        ComponentHealth {
            name: state.compositor().name().to_string(),
            ok: compositor.is_ok(),
            error: compositor.err().map(|e| e.to_string()),
        },
        ComponentHealth {
            name: state.separator().name().to_string(),
            ok: separator.is_ok(),
            error: separator.err().map(|e| e.to_string()),
        },
        ComponentHealth {
            name: state.vector().name().to_string(),
            ok: vector.is_ok(),
            error: vector.err().map(|e| e.to_string()),
        },
    ];

    let all_ok = components.iter().all(|c| c.ok);
    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if all_ok { "ok" } else { "degraded" }.to_string(),
            components,
        }),
    )
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics() -> String {
    encode_metrics()
}
