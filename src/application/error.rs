use thiserror::Error;

use crate::{
    application::fetcher::FetchError, config::ConfigError, infra::error::InfraError,
    infra::remote::HttpFetcherError,
};

/// Coarse classification of a failed load, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Remote,
    Network,
    Parse,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("not connected: an app identity must be configured before loading content")]
    NotConnected,
    #[error(transparent)]
    Setup(#[from] HttpFetcherError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected | Self::Setup(_) => ErrorKind::Configuration,
            Self::Fetch(FetchError::Remote { .. }) => ErrorKind::Remote,
            Self::Fetch(FetchError::Network { .. }) => ErrorKind::Network,
            Self::Fetch(FetchError::Parse { .. }) => ErrorKind::Parse,
        }
    }
}

/// Top-level error for the `tessera` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn kinds_follow_the_failure_source() {
        assert_eq!(LoadError::NotConnected.kind(), ErrorKind::Configuration);

        let remote = LoadError::from(FetchError::Remote {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "https://api.example.com/apps/site/content/main".into(),
        });
        assert_eq!(remote.kind(), ErrorKind::Remote);
        assert!(remote.to_string().contains("500 Internal Server Error"));
        assert!(remote.to_string().contains("/apps/site/content/main"));

        let parse_source = serde_json::from_str::<serde_json::Value>("{").expect_err("bad json");
        let parse = LoadError::from(FetchError::Parse {
            url: "u".into(),
            source: parse_source,
        });
        assert_eq!(parse.kind(), ErrorKind::Parse);
    }
}
