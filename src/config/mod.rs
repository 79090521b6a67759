//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    num::NonZeroUsize,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::{CacheConfig, MAX_TTL_SECONDS};
use crate::domain::options::{EditMode, RequestOptions};
use crate::infra::remote::HttpFetcher;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "tessera";
const ENV_PREFIX: &str = "TESSERA";
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.tessera.dev/v1";

/// Command-line arguments for the `tessera` binary.
#[derive(Debug, Parser)]
#[command(
    name = "tessera",
    version,
    about = "Load content sections from a remote content API"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "TESSERA_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Load sections and print them as JSON.
    Load(LoadArgs),
    /// Print the cache key a section would be stored under.
    Key(KeyArgs),
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Section ids; each argument may itself be comma-separated.
    #[arg(value_name = "IDS", required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Request draft content; skips the cache.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub draft: bool,

    /// Request edit mode; implies --draft.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub edit: bool,

    /// Language variant to request.
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Emit loader decisions at info level.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub trace: bool,

    /// Pretty-print the JSON output.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub pretty: bool,
}

#[derive(Debug, Args, Clone)]
pub struct KeyArgs {
    /// Section id.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Language variant.
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content API base URL.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Override the content API app name.
    #[arg(long = "app", value_name = "NAME", global = true)]
    pub app: Option<String>,

    /// Override the content API request timeout.
    #[arg(long = "timeout-seconds", value_name = "SECONDS", global = true)]
    pub timeout_seconds: Option<u64>,

    /// Disable the in-process section cache.
    #[arg(long = "no-cache", action = clap::ArgAction::SetTrue, global = true)]
    pub no_cache: bool,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub defaults: RequestOptions,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    /// App identity; a client cannot be built without it.
    pub app: Option<String>,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: NonZeroUsize,
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    cache: RawCacheSettings,
    defaults: RawDefaultSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(app) = overrides.app.as_ref() {
            self.api.app = Some(app.clone());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.api.timeout_seconds = Some(seconds);
        }
        if overrides.no_cache {
            self.cache.enabled = Some(false);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let RawSettings {
            api,
            cache,
            defaults,
            logging,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            cache: build_cache_settings(cache)?,
            defaults: build_default_options(defaults)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, ConfigError> {
    let base_url_value = api
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(base_url_value.trim())
        .map_err(|err| ConfigError::invalid("api.base_url", format!("failed to parse: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "api.base_url",
            "scheme must be http or https",
        ));
    }
    if base_url.cannot_be_a_base() {
        return Err(ConfigError::invalid(
            "api.base_url",
            "URL must be able to carry a path",
        ));
    }

    let app = trimmed(api.app);

    let timeout = match api.timeout_seconds {
        Some(0) => {
            return Err(ConfigError::invalid(
                "api.timeout_seconds",
                "must be greater than zero",
            ));
        }
        Some(seconds) => Some(Duration::from_secs(seconds)),
        None => None,
    };

    let user_agent = match api.user_agent {
        Some(value) => trimmed(Some(value)).ok_or_else(|| {
            ConfigError::invalid("api.user_agent", "must not be empty")
        })?,
        None => HttpFetcher::default_user_agent().to_string(),
    };

    Ok(ApiSettings {
        base_url,
        app,
        timeout,
        user_agent,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, ConfigError> {
    let defaults = CacheConfig::default();

    let capacity_value = cache.capacity.unwrap_or(defaults.capacity);
    let capacity = NonZeroUsize::new(capacity_value)
        .ok_or_else(|| ConfigError::invalid("cache.capacity", "must be greater than zero"))?;

    let ttl_seconds = cache.ttl_seconds.unwrap_or(defaults.ttl_seconds);
    if ttl_seconds == 0 {
        return Err(ConfigError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }
    if ttl_seconds > MAX_TTL_SECONDS {
        return Err(ConfigError::invalid(
            "cache.ttl_seconds",
            format!("must be at most {MAX_TTL_SECONDS} (one year)"),
        ));
    }

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(defaults.enabled),
        capacity,
        ttl: Duration::from_secs(ttl_seconds),
    })
}

fn build_default_options(defaults: RawDefaultSettings) -> Result<RequestOptions, ConfigError> {
    let edit_mode = match defaults.edit_mode {
        Some(value) => EditMode::from_str(&value)
            .map_err(|err| ConfigError::invalid("defaults.edit_mode", err.to_string()))?,
        None => EditMode::Off,
    };

    Ok(RequestOptions {
        draft: defaults.draft.unwrap_or(false),
        edit_mode,
        lang: trimmed(defaults.lang),
        log: defaults.log.unwrap_or(false),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, ConfigError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            ConfigError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    app: Option<String>,
    timeout_seconds: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    capacity: Option<usize>,
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDefaultSettings {
    draft: Option<bool>,
    edit_mode: Option<String>,
    lang: Option<String>,
    log: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), ConfigError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
