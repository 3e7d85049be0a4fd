//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use infercache_cache::CacheStats;
use infercache_coordinator::CoordinatorMetrics;
use infercache_core::types::Prediction;

/// Request to run inference.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Input text for the model
    pub text: String,
}

/// Response for inference.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Model output (fresh or cached)
    pub result: String,
    /// Whether the output was served from the cache
    pub cache_hit: bool,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            result: prediction.result,
            cache_hit: prediction.cache_hit,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Server start time (RFC 3339)
    pub started_at: String,
    /// Name of the model behind the cache
    pub model: String,
    /// Lifetime of cached results
    pub cache_ttl_seconds: u64,
}

/// Cache and request counters.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    /// Store contents and lookup counters
    pub cache: CacheStats,
    /// Request-level counters
    pub requests: CoordinatorMetrics,
}

/// Response for clearing the cache.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    /// Number of entries dropped
    pub cleared: usize,
}
