//! Router assembly.

use crate::events::events;
use crate::install::install;
use crate::state::SensorApi;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the sensor router. Bodies over `max_body_bytes` are rejected with
/// 413 before reaching a handler.
pub fn router(api: Arc<SensorApi>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/install", post(install))
        .route("/events", post(events))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(api)
}
