//! Section id normalization.
//!
//! Callers may pass a comma-joined string or any sequence of ids. Every form
//! is reduced to the same ordered list: comma-split, trimmed, blank segments
//! dropped, repeats removed while keeping the first occurrence.

use std::collections::HashSet;

/// Separator used both for comma-joined input and for the remote path segment.
pub const ID_SEPARATOR: char = ',';

/// Ordered, duplicate-free list of section ids requested by one load call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionIds(Vec<String>);

impl SectionIds {
    pub fn normalize<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for part in parts {
            for segment in part.as_ref().split(ID_SEPARATOR) {
                let id = segment.trim();
                if id.is_empty() || !seen.insert(id.to_string()) {
                    continue;
                }
                ids.push(id.to_string());
            }
        }

        Self(ids)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|candidate| candidate == id)
    }

    /// Ids joined into the single path segment sent to the content API.
    pub fn joined(&self) -> String {
        join_ids(&self.0)
    }
}

pub(crate) fn join_ids(ids: &[String]) -> String {
    ids.join(&ID_SEPARATOR.to_string())
}

impl From<&str> for SectionIds {
    fn from(value: &str) -> Self {
        Self::normalize([value])
    }
}

impl From<String> for SectionIds {
    fn from(value: String) -> Self {
        Self::normalize([value])
    }
}

impl From<&String> for SectionIds {
    fn from(value: &String) -> Self {
        Self::normalize([value])
    }
}

impl From<Vec<String>> for SectionIds {
    fn from(value: Vec<String>) -> Self {
        Self::normalize(value)
    }
}

impl From<Vec<&str>> for SectionIds {
    fn from(value: Vec<&str>) -> Self {
        Self::normalize(value)
    }
}

impl From<&[String]> for SectionIds {
    fn from(value: &[String]) -> Self {
        Self::normalize(value)
    }
}

impl From<&[&str]> for SectionIds {
    fn from(value: &[&str]) -> Self {
        Self::normalize(value)
    }
}

impl<const N: usize> From<[&str; N]> for SectionIds {
    fn from(value: [&str; N]) -> Self {
        Self::normalize(value)
    }
}

impl<'a> IntoIterator for &'a SectionIds {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_joined_and_sequence_forms_agree() {
        let joined = SectionIds::from("main, home,footer");
        let listed = SectionIds::from(["main", "home", "footer"]);
        assert_eq!(joined, listed);
        assert_eq!(joined.as_slice(), ["main", "home", "footer"]);
    }

    #[test]
    fn repeats_keep_first_position() {
        let ids = SectionIds::from(vec!["home", "main", "home", "main,footer"]);
        assert_eq!(ids.as_slice(), ["home", "main", "footer"]);
    }

    #[test]
    fn blank_segments_are_dropped() {
        let ids = SectionIds::from(" ,main,, ");
        assert_eq!(ids.as_slice(), ["main"]);
        assert!(SectionIds::from("").is_empty());
    }

    #[test]
    fn joined_uses_comma() {
        let ids = SectionIds::from(["a", "b"]);
        assert_eq!(ids.joined(), "a,b");
    }
}
