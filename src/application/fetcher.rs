//! Remote fetch boundary used by the loader.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::app::AppName;
use crate::domain::content::ContentMap;
use crate::domain::options::ResolvedOptions;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("content API responded `{status}` for {url}")]
    Remote { status: StatusCode, url: String },
    #[error("failed to reach content API at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("content API returned a malformed body for {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Remote { url, .. } | Self::Network { url, .. } | Self::Parse { url, .. } => url,
        }
    }
}

/// Retrieves a batch of sections from the content API in a single request.
///
/// Implementations must either return content for the whole batch or fail;
/// ids the server does not know may simply be absent from the map.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(
        &self,
        app: &AppName,
        ids: &[String],
        options: &ResolvedOptions,
    ) -> Result<ContentMap, FetchError>;
}
