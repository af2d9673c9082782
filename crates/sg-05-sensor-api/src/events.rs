//! `POST /events`: accept a batch of sensor events.

use crate::auth::{require_bearer, require_json};
use crate::error::ApiError;
use crate::state::SensorApi;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Events handler. Success is a bare 200.
pub async fn events(
    State(api): State<Arc<SensorApi>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_json(&headers)?;
    let token = require_bearer(&headers)?;

    let claims = api
        .tokens
        .verify_token(token)
        .map_err(|e| ApiError::unauthorized(format!("Token rejected: {e}")))?;

    let batch = api
        .registry
        .parse_batch(&body, claims.sensor, claims.group)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    api.outputs
        .consume(&batch)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    debug!(sensor = %claims.sensor, events = batch.len(), "Events accepted");
    Ok(StatusCode::OK)
}
