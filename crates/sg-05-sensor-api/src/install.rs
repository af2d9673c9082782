//! `POST /install`: exchange an install key for a sensor token.

use crate::auth::{bearer_token, require_json};
use crate::error::ApiError;
use crate::state::SensorApi;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, PRAGMA};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sg_01_install_auth::Key;
use sg_03_events::Event;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use uuid::Uuid;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Install request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallRequest {
    pub key: Key,
    /// Free-form label recorded in the install event
    #[serde(default)]
    pub label: String,
}

/// Install response body. Times are unix microseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResponse {
    pub token: String,
    pub sensor: Uuid,
    pub expires_at: i64,
    pub issued_at: i64,
}

/// Install handler. Every response, including errors, is marked uncacheable.
pub async fn install(
    State(api): State<Arc<SensorApi>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = handle_install(api, &headers, &body).await.map(Json);
    ([(CACHE_CONTROL, "no-store"), (PRAGMA, "no-cache")], result).into_response()
}

async fn handle_install(
    api: Arc<SensorApi>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<InstallResponse, ApiError> {
    require_json(headers)?;
    let renewal = bearer_token(headers)?;

    let request: InstallRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Failed to parse install request: {e}")))?;
    let group = request.key.group;

    let accepted = {
        let api = Arc::clone(&api);
        let key = request.key.clone();
        tokio::task::spawn_blocking(move || api.is_key_accepted(&key))
            .await
            .map_err(|e| ApiError::internal(format!("Key verification task failed: {e}")))?
    };
    if !accepted {
        return Err(ApiError::bad_request(format!(
            "Install key does not match any verifier of group {group}"
        )));
    }

    let sensor = renewal
        .and_then(|token| renewed_sensor(&api, token, group))
        .unwrap_or_else(Uuid::new_v4);

    let issued = api
        .tokens
        .new_token(group, sensor)
        .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))?;

    let event = Event::install(request.label, now_micros(), sensor, group);
    if let Err(e) = api.outputs.consume(std::slice::from_ref(&event)) {
        warn!(sensor = %sensor, group = %group, error = %e, "Install event was not delivered");
    }

    info!(sensor = %sensor, group = %group, "Sensor installed");

    Ok(InstallResponse {
        token: issued.token,
        sensor,
        expires_at: issued.expires_at.saturating_mul(MICROS_PER_SECOND),
        issued_at: issued.issued_at.saturating_mul(MICROS_PER_SECOND),
    })
}

/// Sensor id carried by a renewal token, if the token is valid and belongs
/// to `group`.
fn renewed_sensor(api: &SensorApi, token: &str, group: Uuid) -> Option<Uuid> {
    match api.tokens.verify_token(token) {
        Ok(claims) if claims.group == group => {
            debug!(sensor = %claims.sensor, "Renewing existing sensor");
            Some(claims.sensor)
        }
        Ok(claims) => {
            info!(
                token_group = %claims.group,
                key_group = %group,
                "Renewal token is for another group. Installing as a new sensor"
            );
            None
        }
        Err(e) => {
            info!(error = %e, "Renewal token rejected. Installing as a new sensor");
            None
        }
    }
}

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}
