//! Error types for infercache.
//!
//! Every failure a request can hit is one of these variants. Errors always
//! surface to the immediate caller; the core never retries.

use thiserror::Error;

/// Result type alias using `InferError`.
pub type Result<T> = std::result::Result<T, InferError>;

/// Main error type for request processing.
#[derive(Debug, Error)]
pub enum InferError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CLIENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Malformed or missing payload. Rejected before the cache is consulted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // COMPUTE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The injected inference function failed. Nothing is cached.
    #[error("Compute failed: {0}")]
    ComputeFailure(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Structural fault inside the cache store (should never happen).
    #[error("Cache store fault: {0}")]
    StoreFault(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (listener bind, socket accept).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InferError {
    /// Returns true if the caller sent something it must fix before retrying.
    pub fn is_client_error(&self) -> bool {
        matches!(self, InferError::InvalidInput(_))
    }

    /// Returns true if resubmitting the same request may succeed.
    ///
    /// Compute failures are never cached, so an identical request recomputes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InferError::ComputeFailure(_) | InferError::Io(_))
    }
}
