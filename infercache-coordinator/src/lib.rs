//! # infercache Coordinator
//!
//! Puts the TTL cache in front of an inference function.
//!
//! - **Key derivation**: payload normalization and deterministic cache keys
//! - **Coordinator**: lookup, compute on miss, store, report hit/miss
//! - **Models**: a template stand-in and a remote HTTP backend
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use infercache_cache::TtlCache;
//! use infercache_coordinator::{RequestCoordinator, TemplateModel};
//!
//! let cache = Arc::new(TtlCache::new(Duration::from_secs(500)));
//! let coordinator = RequestCoordinator::new(cache, TemplateModel::new());
//!
//! let first = coordinator.handle("hello").await?;   // computed
//! let second = coordinator.handle("hello").await?;  // served from cache
//! assert!(!first.cache_hit && second.cache_hit);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod coordinator;
pub mod http_model;
pub mod key;
pub mod template;

pub use coordinator::{CoordinatorMetrics, RequestCoordinator};
pub use http_model::HttpModel;
pub use key::{derive_key, normalize, validate_payload};
pub use template::TemplateModel;
