//! In-memory TTL cache.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use infercache_core::{CacheKey, Clock};

use crate::clock::SystemClock;

/// Cache entry with its expiry deadline.
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when `stored_at + ttl` overflows the clock: never expires.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// Valid on `[stored_at, expires_at)`.
    fn is_live_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now < deadline,
            None => true,
        }
    }
}

/// Concurrent cache whose entries expire a fixed TTL after being written.
///
/// Thread-safe: the map is sharded, so operations on keys in different
/// shards never contend, and no lock is held beyond a single call.
///
/// # Expiry
///
/// An entry written at `t` is visible to lookups at any `now` with
/// `t <= now < t + ttl`. Expired entries are logically absent. They are
/// physically dropped when a lookup trips over them, or by
/// [`purge_expired`](Self::purge_expired) / [`clear`](Self::clear).
///
/// # Capacity
///
/// Unbounded. There is no size limit and no LRU eviction; keys written once
/// and never looked up again stay resident until purged or cleared.
pub struct TtlCache<V> {
    entries: DashMap<CacheKey, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache with the given TTL on the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with the given TTL and time source.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Gets a cached value.
    ///
    /// Returns `None` if the key was never stored or its entry has expired.
    /// An expired entry is removed as a side effect, unless a concurrent
    /// `put` has already replaced it with a live one.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();

        let found = self
            .entries
            .get(key)
            .map(|entry| entry.is_live_at(now).then(|| entry.value.clone()));

        // The shard guard taken by `get` is gone here; `remove_if` relocks it.
        match found {
            Some(Some(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some(None) => {
                self.drop_if_expired(key, now);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Removes the entry for `key` only if it is expired as of `now`.
    ///
    /// A lookup may observe an expired entry that a concurrent `put` replaces
    /// before the removal runs; the replacement is live and stays.
    fn drop_if_expired(&self, key: &CacheKey, now: Instant) -> bool {
        let dropped = self
            .entries
            .remove_if(key, |_, entry| !entry.is_live_at(now))
            .is_some();
        if dropped {
            debug!(key = %key.short(), "Dropped expired entry on lookup");
        }
        dropped
    }

    /// Stores a value, expiring `ttl` from now.
    ///
    /// Unconditionally overwrites any previous entry for the key.
    pub fn put(&self, key: CacheKey, value: V) {
        let expires_at = self.clock.now().checked_add(self.ttl);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Returns the TTL applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Removes an entry. Returns true if one was present (expired or not).
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Clears all entries. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        self.entries.retain(|_, _| {
            dropped += 1;
            false
        });
        debug!(dropped, "Cleared cache");
        dropped
    }

    /// Removes every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut dropped = 0;
        self.entries.retain(|_, entry| {
            let live = entry.is_live_at(now);
            if !live {
                dropped += 1;
            }
            live
        });
        debug!(dropped, "Purged expired entries");
        dropped
    }

    /// Returns the number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut total = 0;
        let mut expired = 0;
        for entry in self.entries.iter() {
            total += 1;
            if !entry.is_live_at(now) {
                expired += 1;
            }
        }

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            valid_entries: total - expired,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl_seconds: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
