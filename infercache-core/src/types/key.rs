//! Cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key identifying one cached inference result.
///
/// Built from the meaningful content of a request. Two requests with the
/// same meaningful content always map to equal keys. A key never changes
/// after it is built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an already-derived key string.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short prefix suitable for log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality() {
        assert_eq!(CacheKey::from_raw("abc"), CacheKey::from_raw(String::from("abc")));
        assert_ne!(CacheKey::from_raw("abc"), CacheKey::from_raw("abd"));
    }

    #[test]
    fn test_key_short() {
        let key = CacheKey::from_raw("0123456789abcdef0123");
        assert_eq!(key.short(), "0123456789ab");
        assert_eq!(CacheKey::from_raw("abc").short(), "abc");
    }

    #[test]
    fn test_key_serializes_as_string() {
        let key = CacheKey::from_raw("deadbeef");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"deadbeef\"");
    }
}
