//! API key check for protected routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use infercache_core::constants::API_KEY_HEADER;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejects requests whose `X-API-KEY` header does not match the configured key.
///
/// Fails closed: with no key configured, every request is rejected.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let authorized = match (state.config.auth_key.as_deref(), provided) {
        (Some(expected), Some(provided)) => bool::from(provided.as_bytes().ct_eq(expected.as_bytes())),
        _ => false,
    };

    if !authorized {
        warn!(
            path = %request.uri().path(),
            key_present = provided.is_some(),
            "Unauthorized access attempt"
        );
        return ApiError::forbidden("Invalid API Key").into_response();
    }

    debug!(path = %request.uri().path(), "Authenticated request");
    next.run(request).await
}
