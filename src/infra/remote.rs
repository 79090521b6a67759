//! reqwest-backed content API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::fetcher::{ContentFetcher, FetchError};
use crate::domain::app::AppName;
use crate::domain::content::ContentMap;
use crate::domain::ids::join_ids;
use crate::domain::options::ResolvedOptions;

const METRIC_FETCH_TOTAL: &str = "tessera_fetch_total";
const METRIC_FETCH_MS: &str = "tessera_fetch_ms";

#[derive(Debug, Error)]
pub enum HttpFetcherError {
    #[error("content API base URL `{0}` cannot carry a path")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub base_url: Url,
    /// Whole-request timeout; `None` keeps reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl HttpFetcherConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
            user_agent: HttpFetcher::default_user_agent().to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches section batches with `GET {base}/apps/{app}/content/{ids}`.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(config: &HttpFetcherConfig) -> Result<Self, HttpFetcherError> {
        if config.base_url.cannot_be_a_base() {
            return Err(HttpFetcherError::InvalidBaseUrl(
                config.base_url.to_string(),
            ));
        }

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base: config.base_url.clone(),
        })
    }

    pub fn default_user_agent() -> &'static str {
        concat!("tessera/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build the request URL for one batch.
    ///
    /// `draft=1` is only present in draft mode and `lang` only when set.
    pub fn content_url(&self, app: &AppName, ids: &[String], options: &ResolvedOptions) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);

        // `new` rejected cannot-be-a-base URLs, so segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["apps", app.as_str(), "content", join_ids(ids).as_str()]);
        }

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if options.draft {
            pairs.push(("draft", "1"));
        }
        if let Some(lang) = options.lang.as_deref() {
            pairs.push(("lang", lang));
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        url
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    #[instrument(skip_all, fields(app = %app, ids = ids.len(), draft = options.draft))]
    async fn fetch(
        &self,
        app: &AppName,
        ids: &[String],
        options: &ResolvedOptions,
    ) -> Result<ContentMap, FetchError> {
        let url = self.content_url(app, ids, options);
        let url_text = url.to_string();
        let mode = if options.draft { "draft" } else { "published" };
        let started_at = Instant::now();

        counter!(METRIC_FETCH_TOTAL, "mode" => mode).increment(1);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url_text.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Remote {
                status,
                url: url_text,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                url: url_text.clone(),
                source,
            })?;

        let content: ContentMap =
            serde_json::from_slice(&body).map_err(|source| FetchError::Parse {
                url: url_text.clone(),
                source,
            })?;

        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_FETCH_MS, "mode" => mode).record(elapsed_ms);
        debug!(
            url = %url_text,
            sections = content.len(),
            elapsed_ms,
            "fetched sections from content API"
        );

        Ok(content)
    }
}
