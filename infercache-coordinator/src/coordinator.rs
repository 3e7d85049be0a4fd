//! Request coordinator: cache lookup in front of the inference function.
//!
//! ```text
//! handle(payload)
//!   ├─ validate        InvalidInput → caller, cache untouched
//!   ├─ derive_key
//!   ├─ cache.get ──── hit  → { result, cache_hit: true }
//!   └─ model.infer ── ok   → cache.put → { result, cache_hit: false }
//!                     err  → ComputeFailure → caller, nothing cached
//! ```
//!
//! There is no per-key locking. Two requests that miss on the same key at the
//! same time both compute and both store; whichever `put` lands last wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use infercache_cache::TtlCache;
use infercache_core::error::{InferError, Result};
use infercache_core::traits::InferenceModel;
use infercache_core::types::Prediction;

use crate::key::{derive_key, validate_payload};

/// Serves repeated payloads from the cache and computes the rest.
pub struct RequestCoordinator<M> {
    cache: Arc<TtlCache<String>>,
    model: M,
    requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    compute_failures: AtomicU64,
    invalid_inputs: AtomicU64,
}

impl<M: InferenceModel> RequestCoordinator<M> {
    /// Creates a coordinator over an injected cache and model.
    pub fn new(cache: Arc<TtlCache<String>>, model: M) -> Self {
        Self {
            cache,
            model,
            requests: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            compute_failures: AtomicU64::new(0),
            invalid_inputs: AtomicU64::new(0),
        }
    }

    /// Handles one request.
    ///
    /// On a hit the model is not called and the cache is not written. On a
    /// miss the model is called exactly once with the original payload and
    /// its output is stored exactly once. A failed computation is returned
    /// as [`InferError::ComputeFailure`] and leaves the cache unchanged, so
    /// the next identical request computes again.
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn handle(&self, payload: &str) -> Result<Prediction> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if let Err(err) = validate_payload(payload) {
            self.invalid_inputs.fetch_add(1, Ordering::Relaxed);
            return Err(err);
        }

        let key = derive_key(payload);

        if let Some(result) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            info!(key = %key.short(), "Cache hit");
            debug!(payload, "Cache hit payload");
            return Ok(Prediction::hit(result));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let output = match self.model.infer(payload).await {
            Ok(output) => output,
            Err(err) => {
                self.compute_failures.fetch_add(1, Ordering::Relaxed);
                error!(key = %key.short(), model = self.model.name(), error = %err, "Error while generating answer");
                return Err(match err {
                    InferError::ComputeFailure(_) => err,
                    other => InferError::ComputeFailure(other.to_string()),
                });
            }
        };

        info!(key = %key.short(), model = self.model.name(), "Generated answer");
        self.cache.put(key, output.clone());
        Ok(Prediction::miss(output))
    }

    /// The cache this coordinator reads and writes.
    pub fn cache(&self) -> &Arc<TtlCache<String>> {
        &self.cache
    }

    /// The model invoked on misses.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Request counters since construction.
    pub fn metrics(&self) -> CoordinatorMetrics {
        CoordinatorMetrics {
            requests: self.requests.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compute_failures: self.compute_failures.load(Ordering::Relaxed),
            invalid_inputs: self.invalid_inputs.load(Ordering::Relaxed),
        }
    }
}

/// Request counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorMetrics {
    /// Requests received
    pub requests: u64,
    /// Requests served from cache
    pub hits: u64,
    /// Requests that invoked the model
    pub misses: u64,
    /// Model invocations that failed
    pub compute_failures: u64,
    /// Requests rejected before the cache was consulted
    pub invalid_inputs: u64,
}
