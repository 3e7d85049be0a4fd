//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// POST /predict
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let prediction = state.coordinator.handle(&req.text).await?;

    Ok(Json(PredictResponse::from(prediction)))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    info!("Health check endpoint called");

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        started_at: state.started_at_utc.to_rfc3339(),
        model: state.coordinator.model().name().into(),
        cache_ttl_seconds: state.config.cache_ttl_seconds,
    })
}

/// GET /cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        cache: state.coordinator.cache().stats(),
        requests: state.coordinator.metrics(),
    })
}

/// DELETE /cache
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ClearCacheResponse> {
    let cleared = state.coordinator.cache().clear();
    info!(cleared, "Cache cleared");
    Json(ClearCacheResponse { cleared })
}
