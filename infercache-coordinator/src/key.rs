//! Payload validation and cache key derivation.
//!
//! ```text
//! key = hex(SHA3-256(len(domain) || domain || trim(payload)))
//! ```
//!
//! Only surrounding whitespace is considered meaningless. Case and interior
//! whitespace are kept, since the model may treat them differently.

use sha3::{Digest, Sha3_256};

use infercache_core::constants::{CACHE_KEY_DOMAIN, MAX_PAYLOAD_BYTES};
use infercache_core::error::{InferError, Result};
use infercache_core::types::CacheKey;

/// Returns the meaningful content of a payload.
pub fn normalize(payload: &str) -> &str {
    payload.trim()
}

/// Checks that a payload is present and within size limits.
pub fn validate_payload(payload: &str) -> Result<()> {
    if normalize(payload).is_empty() {
        return Err(InferError::InvalidInput("text must not be empty".into()));
    }
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(InferError::InvalidInput(format!(
            "text is {} bytes, limit is {}",
            payload.len(),
            MAX_PAYLOAD_BYTES
        )));
    }
    Ok(())
}

/// Derives the cache key for a payload. Pure and deterministic.
pub fn derive_key(payload: &str) -> CacheKey {
    let mut hasher = Sha3_256::new();
    hasher.update((CACHE_KEY_DOMAIN.len() as u32).to_le_bytes());
    hasher.update(CACHE_KEY_DOMAIN);
    hasher.update(normalize(payload).as_bytes());
    CacheKey::from_raw(hex::encode(hasher.finalize()))
}
