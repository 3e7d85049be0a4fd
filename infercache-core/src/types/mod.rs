//! Domain types for infercache.
//!
//! - [`CacheKey`]: deterministic key derived from a request payload
//! - [`Prediction`]: result handed back to the caller, with its hit flag

mod key;
mod prediction;

pub use key::*;
pub use prediction::*;
