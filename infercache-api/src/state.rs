//! App state: configuration, cache, coordinator.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use infercache_cache::TtlCache;
use infercache_coordinator::{HttpModel, RequestCoordinator, TemplateModel};
use infercache_core::constants::{DEFAULT_MODEL_TIMEOUT, DEFAULT_TTL_SECONDS};
use infercache_core::error::{InferError, Result};
use infercache_core::traits::InferenceModel;

/// Server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Key expected in `X-API-KEY`; `None` rejects every protected request
    pub auth_key: Option<String>,
    /// Lifetime of cached results
    pub cache_ttl_seconds: u64,
    /// Remote inference server; `None` uses the template model
    pub model_endpoint: Option<String>,
    /// Per-request timeout for the remote inference server
    pub model_timeout_seconds: u64,
    /// Simulated latency of the template model
    pub model_latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            cache_ttl_seconds: DEFAULT_TTL_SECONDS,
            model_endpoint: None,
            model_timeout_seconds: DEFAULT_MODEL_TIMEOUT.as_secs(),
            model_latency_ms: 0,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from the environment, after loading `.env` if present.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `AUTH_KEY` | unset |
    /// | `CACHE_TTL_SECONDS` | 500 |
    /// | `MODEL_ENDPOINT` | unset (template model) |
    /// | `MODEL_TIMEOUT_SECONDS` | 30 |
    /// | `MODEL_LATENCY_MS` | 0 |
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Ok(Self {
            auth_key: env_string("AUTH_KEY"),
            cache_ttl_seconds: env_u64("CACHE_TTL_SECONDS", defaults.cache_ttl_seconds)?,
            model_endpoint: env_string("MODEL_ENDPOINT"),
            model_timeout_seconds: env_u64("MODEL_TIMEOUT_SECONDS", defaults.model_timeout_seconds)?,
            model_latency_ms: env_u64("MODEL_LATENCY_MS", defaults.model_latency_ms)?,
        })
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_seconds == 0 {
            return Err(InferError::Config("cache TTL must be at least 1 second".into()));
        }
        if self.model_endpoint.is_some() && self.model_timeout_seconds == 0 {
            return Err(InferError::Config("model timeout must be at least 1 second".into()));
        }
        Ok(())
    }

    /// The cache TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("auth_key", &self.auth_key.as_ref().map(|_| "<redacted>"))
            .field("cache_ttl_seconds", &self.cache_ttl_seconds)
            .field("model_endpoint", &self.model_endpoint)
            .field("model_timeout_seconds", &self.model_timeout_seconds)
            .field("model_latency_ms", &self.model_latency_ms)
            .finish()
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            InferError::Config(format!("{} must be a non-negative integer, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

/// Shared state behind every handler.
pub struct AppState {
    /// Configuration the server was started with
    pub config: ApiConfig,
    /// Cache plus model; one per process
    pub coordinator: RequestCoordinator<Arc<dyn InferenceModel>>,
    /// Monotonic start time, for uptime
    pub started_at: Instant,
    /// Wall-clock start time, for display
    pub started_at_utc: DateTime<Utc>,
}

impl AppState {
    /// Builds state from configuration, choosing the model it names.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let model: Arc<dyn InferenceModel> = match &config.model_endpoint {
            Some(endpoint) => Arc::new(HttpModel::with_timeout(
                endpoint,
                Duration::from_secs(config.model_timeout_seconds),
            )?),
            None => Arc::new(TemplateModel::with_latency(Duration::from_millis(
                config.model_latency_ms,
            ))),
        };

        Ok(Self::with_model(config, model))
    }

    /// Builds state around an explicit model.
    pub fn with_model(config: ApiConfig, model: Arc<dyn InferenceModel>) -> Self {
        let cache = Arc::new(TtlCache::new(config.ttl()));

        Self {
            config,
            coordinator: RequestCoordinator::new(cache, model),
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }
}
