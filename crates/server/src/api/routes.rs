use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{assets, handlers, middleware as api_middleware, parse};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Leave headroom above the configured cap so the limit check in the
    // handler produces the explicit 413 body.
    let body_limit = (state.config().jobs.max_upload_mb as usize + 8) * 1024 * 1024;

    Router::new()
        .route("/parse", post(parse::parse))
        .route("/assets/{job_id}/{filename}", get(assets::get_asset))
        .route(
            "/internal/assets/{job_id}/{filename}",
            get(assets::get_internal_asset),
        )
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(api_middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
