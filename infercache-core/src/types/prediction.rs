//! Request outcome.

use serde::{Deserialize, Serialize};

/// What a handled request returns: the result and whether it came from cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Output of the inference function (fresh or cached)
    pub result: String,
    /// True when the result was served from the cache without computing
    pub cache_hit: bool,
}

impl Prediction {
    /// A result served from the cache.
    pub fn hit(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            cache_hit: true,
        }
    }

    /// A freshly computed result.
    pub fn miss(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            cache_hit: false,
        }
    }
}
