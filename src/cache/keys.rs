//! Cache key derivation.
//!
//! A key identifies one section's published content for one app and one
//! language. Options that only change how content is obtained (draft, edit
//! mode, logging) never reach the key: draft content is not cached at all.

use std::fmt;

use crate::domain::app::AppName;
use crate::domain::options::ResolvedOptions;

const KEY_NAMESPACE: &str = "tessera";
const KEY_SEPARATOR: char = ':';

/// Opaque cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the key for `section_id` under `app` with the given options.
///
/// Components are form-encoded before joining, so the separator cannot
/// appear inside one and an unset language (empty component) cannot collide
/// with any real language tag.
pub fn derive_key(app: &AppName, section_id: &str, options: &ResolvedOptions) -> CacheKey {
    let lang = options.lang.as_deref().unwrap_or_default();

    let mut key = String::with_capacity(
        KEY_NAMESPACE.len() + app.as_str().len() + lang.len() + section_id.len() + 3,
    );
    key.push_str(KEY_NAMESPACE);
    for component in [app.as_str(), lang, section_id] {
        key.push(KEY_SEPARATOR);
        key.extend(url::form_urlencoded::byte_serialize(component.as_bytes()));
    }

    CacheKey(key)
}
