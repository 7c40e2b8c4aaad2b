//! Injectable TTL key/value store.
//!
//! Read models that are expensive to assemble (payrun summaries) are cached
//! behind [`TtlStore`] so handlers never depend on a process-wide map and
//! tests can supply their own instance.

use moka::sync::Cache;
use std::time::Duration;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// A string-keyed store whose entries expire on their own.
pub trait TtlStore<V>: Send + Sync {
    /// Returns the live value for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn insert(&self, key: String, value: V);
}

/// [`TtlStore`] backed by a moka cache.
#[derive(Clone)]
pub struct MokaTtlStore<V> {
    cache: Cache<String, V>,
}

impl<V> MokaTtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a store with default settings (1000 entries, 5 minute TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a store with a custom capacity and time-to-live.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }
}

impl<V> Default for MokaTtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlStore<V> for MokaTtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key)
    }

    fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value);
    }
}
