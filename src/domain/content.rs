//! Loaded section content and read access over it.

use serde::Serialize;
use serde_json::{Map, Value};

/// Section id to section content. Absent ids were not found.
pub type ContentMap = Map<String, Value>;

/// Read-only view over the sections resolved by one load call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Content {
    sections: ContentMap,
}

impl Content {
    pub fn new(sections: ContentMap) -> Self {
        Self { sections }
    }

    /// Content of a single section.
    pub fn section(&self, id: &str) -> Option<&Value> {
        self.sections.get(id)
    }

    /// Look up a dot-separated path, starting with the section id.
    ///
    /// Numeric segments index into arrays: `home.slides.0.title`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.sections.get(first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_or<'a>(&'a self, path: &str, fallback: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(fallback)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn as_map(&self) -> &ContentMap {
        &self.sections
    }

    pub fn into_map(self) -> ContentMap {
        self.sections
    }
}

impl From<ContentMap> for Content {
    fn from(sections: ContentMap) -> Self {
        Self::new(sections)
    }
}
