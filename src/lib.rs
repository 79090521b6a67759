//! Cache-partitioned loader for multi-section content served by a remote
//! content API.
//!
//! ```no_run
//! # async fn demo() -> Result<(), tessera::application::error::LoadError> {
//! use std::sync::Arc;
//!
//! use tessera::application::loader::ContentClient;
//! use tessera::domain::options::LoadOptions;
//! use tessera::infra::remote::{HttpFetcher, HttpFetcherConfig};
//!
//! let base = "https://api.tessera.dev/v1".parse().expect("valid url");
//! let fetcher = HttpFetcher::new(&HttpFetcherConfig::new(base))?;
//! let client = ContentClient::builder(Arc::new(fetcher)).app("site").build()?;
//!
//! let content = client.load("main,home", &LoadOptions::new().lang("en")).await?;
//! println!("{:?}", content.get_str("home.title"));
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
