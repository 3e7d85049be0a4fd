//! # infercache API Server
//!
//! REST front end for the infercache coordinator.
//!
//! ## Endpoints
//!
//! - `POST /predict` - Run inference, served from cache when possible
//! - `GET /health` - Liveness and configuration summary
//! - `GET /cache/stats` - Cache contents and request counters
//! - `DELETE /cache` - Drop every cached result
//!
//! All endpoints require the `X-API-KEY` header.
//!
//! ## Example
//!
//! ```rust,ignore
//! use infercache_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env()?;
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 8000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod auth;
mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::{HealthResponse, PredictResponse};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use infercache_core::constants::MAX_PAYLOAD_BYTES;
use infercache_core::error::Result;

/// Request bodies above this size are rejected before JSON parsing.
///
/// Leaves room for JSON escaping of a maximum-size payload.
const REQUEST_BODY_LIMIT: usize = MAX_PAYLOAD_BYTES * 6 + 1024;

/// API server for infercache.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(Arc::new(AppState::new(config)?)))
    }

    /// Creates a server around prepared state.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Shared state (cache, coordinator, config).
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address until Ctrl+C.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> Result<()> {
        let addr = addr.into();
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Runs the server on an already-bound listener until Ctrl+C.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let config = &self.state.config;
        if config.auth_key.is_none() {
            warn!("AUTH_KEY is not set; every request will be rejected");
        }

        info!(
            addr = %listener.local_addr()?,
            ttl_seconds = config.cache_ttl_seconds,
            model = self.state.coordinator.model().name(),
            "infercache API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("infercache API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
