//! Per-request load options.
//!
//! [`RequestOptions`] holds a client's defaults, [`LoadOptions`] carries the
//! call-site overrides, and [`ResolvedOptions`] is what the loader acts on
//! once edit mode has been resolved and forced onto `draft`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::DomainError;

/// Query parameter consulted by [`EditMode::QueryString`].
pub const EDIT_QUERY_PARAM: &str = "edit";

/// How edit mode is decided for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Off,
    On,
    /// Enabled when the incoming request carries a truthy `edit` query parameter.
    #[serde(rename = "querystring")]
    QueryString,
}

impl EditMode {
    /// Resolve against the raw query string of the request being served, if any.
    pub fn resolve(self, query: Option<&str>) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::QueryString => query.is_some_and(query_requests_edit),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::QueryString => "querystring",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" | "0" => Ok(Self::Off),
            "on" | "true" | "1" => Ok(Self::On),
            "querystring" | "query" => Ok(Self::QueryString),
            other => Err(DomainError::validation(
                "edit_mode",
                format!("expected off, on or querystring, got `{other}`"),
            )),
        }
    }
}

fn query_requests_edit(query: &str) -> bool {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == EDIT_QUERY_PARAM)
        .any(|(_, value)| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "" | "1" | "true" | "yes" | "on"
            )
        })
}

/// Client-level defaults applied to every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub draft: bool,
    pub edit_mode: EditMode,
    pub lang: Option<String>,
    pub log: bool,
}

impl RequestOptions {
    /// Overlay call-site overrides; a set override wins for that field only.
    pub fn merge(&self, overrides: &LoadOptions) -> Self {
        Self {
            draft: overrides.draft.unwrap_or(self.draft),
            edit_mode: overrides.edit_mode.unwrap_or(self.edit_mode),
            lang: match &overrides.lang {
                Some(lang) => lang.clone(),
                None => self.lang.clone(),
            },
            log: overrides.log.unwrap_or(self.log),
        }
    }

    /// Decide edit mode and force draft when it is on.
    pub fn resolve(self, query: Option<&str>) -> ResolvedOptions {
        let edit = self.edit_mode.resolve(query);
        ResolvedOptions {
            draft: self.draft || edit,
            edit,
            lang: normalize_lang(self.lang),
            log: self.log,
        }
    }
}

/// Call-site overrides; unset fields fall back to the client defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub(crate) draft: Option<bool>,
    pub(crate) edit_mode: Option<EditMode>,
    pub(crate) lang: Option<Option<String>>,
    pub(crate) log: Option<bool>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(mut self, draft: bool) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn edit_mode(mut self, mode: EditMode) -> Self {
        self.edit_mode = Some(mode);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(Some(lang.into()));
        self
    }

    /// Clear a language selected by the client defaults.
    pub fn without_lang(mut self) -> Self {
        self.lang = Some(None);
        self
    }

    pub fn log(mut self, log: bool) -> Self {
        self.log = Some(log);
        self
    }
}

/// Options after merging and edit-mode resolution.
///
/// `edit` implies `draft`; [`RequestOptions::resolve`] is the only constructor
/// outside tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub draft: bool,
    pub edit: bool,
    pub lang: Option<String>,
    pub log: bool,
}

fn normalize_lang(lang: Option<String>) -> Option<String> {
    lang.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
