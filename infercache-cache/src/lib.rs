//! TTL cache store for infercache.
//!
//! Process-local, unbounded, concurrent key/value store whose entries expire
//! a fixed TTL after they are written. Expiry is resolved lazily at lookup
//! time; there is no background sweep.

mod cache;
mod clock;

pub use cache::{CacheStats, TtlCache};
pub use clock::{ManualClock, SystemClock};
