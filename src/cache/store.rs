//! Cache storage.
//!
//! [`CacheStore`] is the boundary the loader talks to. [`MemoryStore`] is the
//! bounded in-process implementation: LRU eviction by capacity plus a
//! per-entry time-to-live after which an entry reads as absent.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT: &str = "tessera_cache_hit_total";
const METRIC_CACHE_MISS: &str = "tessera_cache_miss_total";
const METRIC_CACHE_EVICT: &str = "tessera_cache_evict_total";
const METRIC_CACHE_EXPIRED: &str = "tessera_cache_expired_total";

// Deadline used when `now + ttl` does not fit in an `Instant`; roughly 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Async key-value boundary for cached section content.
///
/// A missing or expired entry is `Ok(None)`, never an error.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: CacheKey, value: Value) -> Result<(), CacheError>;
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Bounded in-process section cache.
pub struct MemoryStore {
    entries: Mutex<LruCache<CacheKey, Entry>>,
    ttl: Duration,
}

impl MemoryStore {
    /// Create a new store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity_non_zero())),
            ttl: config.ttl(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        mutex_lock(&self.entries, SOURCE, "clear").clear();
    }

    fn lookup(&self, key: &CacheKey) -> Option<Value> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                counter!(METRIC_CACHE_HIT).increment(1);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            counter!(METRIC_CACHE_EXPIRED).increment(1);
            debug!(cache_key = %key, "cached section expired");
        }
        counter!(METRIC_CACHE_MISS).increment(1);
        None
    }

    fn store(&self, key: CacheKey, value: Value) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(self.ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let entry = Entry { value, expires_at };

        let evicted = mutex_lock(&self.entries, SOURCE, "set").push(key.clone(), entry);
        // `push` also hands back the previous entry when `key` was already present
        match evicted {
            Some((evicted_key, _)) if evicted_key != key => {
                counter!(METRIC_CACHE_EVICT).increment(1);
                debug!(cache_key = %evicted_key, "evicted cached section");
            }
            _ => {}
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        Ok(self.lookup(key))
    }

    async fn set(&self, key: CacheKey, value: Value) -> Result<(), CacheError> {
        self.store(key, value);
        Ok(())
    }
}

/// Store used when caching is disabled: every read misses, writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Value>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: CacheKey, _value: Value) -> Result<(), CacheError> {
        Ok(())
    }
}
