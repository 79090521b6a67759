#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use tessera::application::fetcher::{ContentFetcher, FetchError};
use tessera::application::loader::ContentClient;
use tessera::cache::{CacheConfig, CacheError, CacheKey, CacheStore, MemoryStore};
use tessera::domain::app::AppName;
use tessera::domain::content::ContentMap;
use tessera::domain::options::{RequestOptions, ResolvedOptions};

pub const APP: &str = "site";

/// One batch the loader asked the fetcher for.
#[derive(Debug, Clone)]
pub struct FetchCall {
    pub ids: Vec<String>,
    pub options: ResolvedOptions,
}

/// Serves every requested id with a body describing how it was requested.
#[derive(Default)]
pub struct RecordingFetcher {
    calls: Mutex<Vec<FetchCall>>,
    unknown: HashSet<String>,
    extra: Option<String>,
    fail_with: Option<StatusCode>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::default()
        }
    }

    /// Ids the fake server omits from its response.
    pub fn with_unknown(mut self, id: &str) -> Self {
        self.unknown.insert(id.to_string());
        self
    }

    /// An id the fake server adds to every response without being asked.
    pub fn with_extra(mut self, id: &str) -> Self {
        self.extra = Some(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

pub fn body_for(id: &str, options: &ResolvedOptions) -> Value {
    json!({
        "id": id,
        "draft": options.draft,
        "lang": options.lang,
    })
}

#[async_trait]
impl ContentFetcher for RecordingFetcher {
    async fn fetch(
        &self,
        app: &AppName,
        ids: &[String],
        options: &ResolvedOptions,
    ) -> Result<ContentMap, FetchError> {
        self.calls.lock().expect("calls lock").push(FetchCall {
            ids: ids.to_vec(),
            options: options.clone(),
        });

        let url = format!("memory://apps/{app}/content/{}", ids.join(","));
        if let Some(status) = self.fail_with {
            return Err(FetchError::Remote { status, url });
        }

        let mut content: ContentMap = ids
            .iter()
            .filter(|id| !self.unknown.contains(*id))
            .map(|id| (id.clone(), body_for(id, options)))
            .collect();
        if let Some(extra) = self.extra.as_ref() {
            content.insert(extra.clone(), json!("unrequested"));
        }
        Ok(content)
    }
}

/// Memory-backed store that counts every call made through the trait.
pub struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(&CacheConfig::default()),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Read an entry without touching the counters.
    pub async fn peek(&self, key: &CacheKey) -> Option<Value> {
        self.inner.get(key).await.expect("memory store never fails")
    }

    /// Seed an entry without touching the counters.
    pub async fn seed(&self, key: CacheKey, value: Value) {
        self.inner
            .set(key, value)
            .await
            .expect("memory store never fails");
    }
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: CacheKey, value: Value) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}

/// Store whose backend is down: every call errors.
#[derive(Default)]
pub struct BrokenStore {
    sets: AtomicUsize,
}

impl BrokenStore {
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for BrokenStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Value>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set(&self, _key: CacheKey, _value: Value) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::unavailable("connection refused"))
    }
}

pub fn client(
    fetcher: Arc<dyn ContentFetcher>,
    store: Arc<dyn CacheStore>,
    defaults: RequestOptions,
) -> ContentClient {
    ContentClient::builder(fetcher)
        .app(APP)
        .defaults(defaults)
        .store(store)
        .build()
        .expect("client with app should build")
}
