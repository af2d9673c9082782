//! Header checks shared by both endpoints.

use crate::error::ApiError;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderMap;

const BEARER_PREFIX: &str = "Bearer ";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Require `Content-Type: application/json`. Parameters such as `charset`
/// are allowed.
pub fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let essence = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim);

    match essence {
        Some(media) if media.eq_ignore_ascii_case(JSON_MEDIA_TYPE) => Ok(()),
        _ => Err(ApiError::UnsupportedMediaType),
    }
}

/// Extract an optional bearer token.
///
/// No header yields `None`. A header that is not `Bearer <token>` is a bad
/// request.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Authorization header is not valid text"))?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(Some(token)),
        _ => Err(ApiError::bad_request(
            "Authorization header does not match Bearer schema",
        )),
    }
}

/// Extract a bearer token that must be present.
pub fn require_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    bearer_token(headers)?.ok_or_else(|| ApiError::bad_request("No Authorization header provided"))
}
