//! Defaults and limits for infercache.

use std::time::Duration;

/// TTL applied when none is configured (seconds).
pub const DEFAULT_TTL_SECONDS: u64 = 500;

/// Largest accepted payload, measured in UTF-8 bytes.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Header carrying the API key on protected routes.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Domain separator mixed into every cache key digest.
///
/// Bumping the version invalidates every key derived by older builds.
pub const CACHE_KEY_DOMAIN: &[u8] = b"INFERCACHE_KEY_V1";

/// Default per-request timeout for remote inference backends.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix produced by the template stand-in model.
pub const TEMPLATE_PREFIX: &str = "Processed text: ";
