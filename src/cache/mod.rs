//! Tessera section cache.
//!
//! Published section content is cached in-process, one entry per
//! (app, language, section id). Draft content is never cached.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `tessera.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 500
//! ttl_seconds = 600
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub(crate) use config::MAX_TTL_SECONDS;
pub use keys::{CacheKey, derive_key};
pub use store::{CacheError, CacheStore, MemoryStore, NoopStore};
