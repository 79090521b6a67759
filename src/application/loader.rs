//! Cache-partitioned section loader.
//!
//! A load resolves every requested section or fails as a whole. Published
//! requests read the cache first and fetch only the ids it does not hold, in
//! one request; draft requests go straight to the content API and never touch
//! the cache.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{instrument, warn};

use crate::application::error::LoadError;
use crate::application::fetcher::ContentFetcher;
use crate::cache::{CacheConfig, CacheKey, CacheStore, MemoryStore, NoopStore, derive_key};
use crate::config::Settings;
use crate::domain::app::AppName;
use crate::domain::content::{Content, ContentMap};
use crate::domain::ids::SectionIds;
use crate::domain::options::{LoadOptions, RequestOptions, ResolvedOptions};
use crate::infra::remote::{HttpFetcher, HttpFetcherConfig};

/// Emit a load trace at `info` when the request asked for logging, `debug` otherwise.
macro_rules! trace_load {
    ($log:expr, $($arg:tt)+) => {
        if $log {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Connected content client.
///
/// Holds the app identity and default options for its whole lifetime; build
/// one per app and share it behind an `Arc`.
pub struct ContentClient {
    app: AppName,
    defaults: RequestOptions,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("app", &self.app)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl ContentClient {
    pub fn builder(fetcher: Arc<dyn ContentFetcher>) -> ContentClientBuilder {
        ContentClientBuilder::new(fetcher)
    }

    /// Build a client talking to the configured content API over HTTP.
    pub fn from_settings(settings: &Settings) -> Result<Self, LoadError> {
        let api = &settings.api;
        let app = api.app.as_deref().ok_or(LoadError::NotConnected)?;

        let mut fetcher_config =
            HttpFetcherConfig::new(api.base_url.clone()).with_user_agent(api.user_agent.clone());
        if let Some(timeout) = api.timeout {
            fetcher_config = fetcher_config.with_timeout(timeout);
        }
        let fetcher = HttpFetcher::new(&fetcher_config)?;

        let cache = CacheConfig::from(&settings.cache);
        let store: Arc<dyn CacheStore> = if cache.enabled {
            Arc::new(MemoryStore::new(&cache))
        } else {
            Arc::new(NoopStore)
        };

        Self::builder(Arc::new(fetcher))
            .app(app)
            .defaults(settings.defaults.clone())
            .store(store)
            .build()
    }

    pub fn app(&self) -> &AppName {
        &self.app
    }

    pub fn defaults(&self) -> &RequestOptions {
        &self.defaults
    }

    /// Merge overrides onto the defaults and resolve edit mode against `query`.
    pub fn resolve(&self, overrides: &LoadOptions, query: Option<&str>) -> ResolvedOptions {
        self.defaults.merge(overrides).resolve(query)
    }

    /// Key under which `section_id` would be cached for these overrides.
    pub fn cache_key(&self, section_id: &str, overrides: &LoadOptions) -> CacheKey {
        derive_key(&self.app, section_id, &self.resolve(overrides, None))
    }

    /// Load sections outside of any request context.
    pub async fn load(
        &self,
        ids: impl Into<SectionIds>,
        overrides: &LoadOptions,
    ) -> Result<Content, LoadError> {
        self.load_for_query(ids, overrides, None).await
    }

    /// Load sections on behalf of an incoming request.
    ///
    /// `query` is the request's raw query string; it only matters when edit
    /// mode is [`EditMode::QueryString`](crate::domain::options::EditMode::QueryString).
    pub async fn load_for_query(
        &self,
        ids: impl Into<SectionIds>,
        overrides: &LoadOptions,
        query: Option<&str>,
    ) -> Result<Content, LoadError> {
        let ids = ids.into();
        let options = self.resolve(overrides, query);
        self.load_resolved(&ids, &options).await.map(Content::new)
    }

    #[instrument(
        skip(self, options),
        fields(
            app = %self.app,
            draft = options.draft,
            lang = options.lang.as_deref().unwrap_or_default()
        )
    )]
    async fn load_resolved(
        &self,
        ids: &SectionIds,
        options: &ResolvedOptions,
    ) -> Result<ContentMap, LoadError> {
        if ids.is_empty() {
            return Ok(ContentMap::new());
        }

        if options.draft {
            trace_load!(
                options.log,
                requested = ids.len(),
                edit = options.edit,
                "draft load, bypassing cache"
            );
            let fetched = self
                .fetcher
                .fetch(&self.app, ids.as_slice(), options)
                .await?;
            return Ok(retain_requested(fetched, ids.as_slice()));
        }

        let cached = self.read_cached(ids, options).await;
        let missing = missing_ids(ids, &cached);

        if missing.is_empty() {
            trace_load!(
                options.log,
                requested = ids.len(),
                "all sections served from cache"
            );
            return Ok(cached);
        }

        trace_load!(
            options.log,
            requested = ids.len(),
            cached = cached.len(),
            missing = ?missing,
            "fetching sections missing from cache"
        );

        // A failed fetch drops `cached` along with it: no partial results
        let fetched = self.fetcher.fetch(&self.app, &missing, options).await?;
        let fetched = retain_requested(fetched, &missing);

        self.repopulate(&fetched, options).await;

        Ok(merge(cached, fetched))
    }

    /// Look up every id concurrently; failed lookups count as misses.
    async fn read_cached(&self, ids: &SectionIds, options: &ResolvedOptions) -> ContentMap {
        let lookups = ids.iter().map(|id| async move {
            let key = derive_key(&self.app, id, options);
            match self.store.get(&key).await {
                Ok(value) => (id, value),
                Err(error) => {
                    warn!(
                        cache_key = %key,
                        error = %error,
                        "cache read failed, treating section as missing"
                    );
                    (id, None)
                }
            }
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, value)| value.map(|value| (id.to_string(), value)))
            .collect()
    }

    /// Write freshly fetched sections back, waiting for every acknowledgment.
    ///
    /// `null` bodies mean "not found" and are not cached.
    async fn repopulate(&self, fetched: &ContentMap, options: &ResolvedOptions) {
        let writes = fetched
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(id, value)| async move {
                let key = derive_key(&self.app, id, options);
                if let Err(error) = self.store.set(key.clone(), value.clone()).await {
                    warn!(
                        cache_key = %key,
                        error = %error,
                        "cache write failed, section will be fetched again"
                    );
                }
            });

        join_all(writes).await;
    }
}

fn missing_ids(ids: &SectionIds, cached: &ContentMap) -> Vec<String> {
    ids.iter()
        .filter(|id| !cached.contains_key(*id))
        .map(str::to_string)
        .collect()
}

fn retain_requested(mut fetched: ContentMap, requested: &[String]) -> ContentMap {
    fetched.retain(|id, _| requested.iter().any(|wanted| wanted == id));
    fetched
}

fn merge(cached: ContentMap, fetched: ContentMap) -> ContentMap {
    let mut merged = ContentMap::new();
    merged.extend(cached);
    merged.extend(fetched);
    merged
}

/// Builder for [`ContentClient`]; the app identity is mandatory.
pub struct ContentClientBuilder {
    app: Option<String>,
    defaults: RequestOptions,
    store: Option<Arc<dyn CacheStore>>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl ContentClientBuilder {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            app: None,
            defaults: RequestOptions::default(),
            store: None,
            fetcher,
        }
    }

    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Cache backend; defaults to a [`MemoryStore`] with default limits.
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<ContentClient, LoadError> {
        let app = self
            .app
            .and_then(|name| AppName::parse(name).ok())
            .ok_or(LoadError::NotConnected)?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new(&CacheConfig::default())));

        Ok(ContentClient {
            app,
            defaults: self.defaults,
            store,
            fetcher: self.fetcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn map(value: Value) -> ContentMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn missing_ids_keeps_request_order() {
        let ids = SectionIds::from("footer,main,home");
        let cached = map(json!({"main": 1}));
        assert_eq!(missing_ids(&ids, &cached), ["footer", "home"]);
    }

    #[test]
    fn merge_covers_both_snapshots() {
        let merged = merge(map(json!({"main": 1})), map(json!({"home": 2})));
        assert_eq!(Value::Object(merged), json!({"main": 1, "home": 2}));
    }

    #[test]
    fn retain_requested_drops_unrequested_ids() {
        let fetched = map(json!({"home": 2, "extra": 3}));
        let kept = retain_requested(fetched, &["home".to_string()]);
        assert_eq!(Value::Object(kept), json!({"home": 2}));
    }
}
