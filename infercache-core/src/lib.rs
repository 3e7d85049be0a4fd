//! # infercache Core
//!
//! Core types, errors, and traits shared by every infercache crate.
//!
//! - **Types**: cache keys and the prediction returned to callers
//! - **Errors**: the request-processing error taxonomy
//! - **Constants**: defaults and limits
//! - **Traits**: the inference function seam and the clock seam
//!
//! ## Example
//!
//! ```rust
//! use infercache_core::{CacheKey, Prediction};
//!
//! let key = CacheKey::from_raw("abc123");
//! let prediction = Prediction::miss("Processed text: hello");
//! assert_eq!(key.as_str(), "abc123");
//! assert!(!prediction.cache_hit);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{InferError, Result};
pub use traits::*;
pub use types::*;
