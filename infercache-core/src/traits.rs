//! Common traits for infercache.
//!
//! These traits are the seams where the cache meets the outside world:
//! the inference function it fronts and the clock it measures expiry with.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// INFERENCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// The inference function the cache sits in front of.
///
/// Treated as a black box: it may be slow, it has no latency bound, and it
/// may fail. Implementations report failure as
/// [`InferError::ComputeFailure`](crate::InferError::ComputeFailure).
///
/// Implementations might be:
/// - A template stand-in (for development and tests)
/// - A remote inference server reached over HTTP
/// - An in-process model runtime
#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Runs inference on the original, un-normalized payload.
    async fn infer(&self, input: &str) -> Result<String>;

    /// Human-readable model name, reported by the health endpoint.
    fn name(&self) -> &str;
}

#[async_trait]
impl<M: InferenceModel + ?Sized> InferenceModel for Arc<M> {
    async fn infer(&self, input: &str) -> Result<String> {
        (**self).infer(input).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Monotonic time source shared by every caller of a cache.
///
/// A single clock instance is shared so that concurrent callers never
/// disagree about whether an entry has expired.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}
