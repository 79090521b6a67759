//! Cache configuration.
//!
//! Controls the in-process section cache via the `[cache]` table.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
pub(crate) const DEFAULT_CAPACITY: usize = 500;
pub(crate) const DEFAULT_TTL_SECONDS: u64 = 600;
/// Longest accepted entry lifetime: one year.
pub(crate) const MAX_TTL_SECONDS: u64 = 86_400 * 365;

/// Cache configuration from `tessera.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve published sections from the in-process cache.
    pub enabled: bool,
    /// Maximum number of cached sections before LRU eviction.
    pub capacity: usize,
    /// Seconds a cached section stays valid.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            capacity: settings.capacity.get(),
            ttl_seconds: settings.ttl.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the entry TTL, clamped to `1..=MAX_TTL_SECONDS` seconds.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.clamp(1, MAX_TTL_SECONDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.capacity, 500);
        assert_eq!(config.ttl(), Duration::from_secs(600));
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            capacity: 0,
            ttl_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.capacity_non_zero().get(), 1);
        assert_eq!(config.ttl(), Duration::from_secs(1));
    }

    #[test]
    fn ttl_is_capped_at_one_year() {
        let config = CacheConfig {
            ttl_seconds: u64::MAX,
            ..Default::default()
        };
        assert_eq!(config.ttl(), Duration::from_secs(MAX_TTL_SECONDS));
    }
}
