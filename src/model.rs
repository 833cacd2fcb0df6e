// Domain model shown by the dashboard.
// Repository snapshots, commits, pull requests, and derived language stats.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::github::PullState;

/// Language name to byte count, in the order the provider reported them.
///
/// Keys are unique: inserting an existing name adds to its count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageBytes {
    entries: Vec<(String, u64)>,
}

impl LanguageBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add bytes for a language, keeping first-occurrence order.
    pub fn add(&mut self, name: &str, bytes: u64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => *count += bytes,
            None => self.entries.push((name.to_string(), bytes)),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for LanguageBytes {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut languages = LanguageBytes::new();
        for (name, bytes) in iter {
            languages.add(name.as_ref(), bytes);
        }
        languages
    }
}

impl Serialize for LanguageBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, bytes) in &self.entries {
            map.serialize_entry(name, bytes)?;
        }
        map.end()
    }
}

struct LanguageBytesVisitor;

impl<'de> Visitor<'de> for LanguageBytesVisitor {
    type Value = LanguageBytes;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of language names to byte counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut languages = LanguageBytes::new();
        while let Some((name, bytes)) = access.next_entry::<String, u64>()? {
            languages.add(&name, bytes);
        }
        Ok(languages)
    }
}

impl<'de> Deserialize<'de> for LanguageBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LanguageBytesVisitor)
    }
}

/// Latest commit of a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub sha: String,
    pub url: String,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// Snapshot of one repository, replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub readme_url: String,
    pub description: Option<String>,
    pub languages: LanguageBytes,
    pub last_commit: Option<Commit>,
    pub readme_excerpt: Option<String>,
    #[serde(default)]
    pub stars: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Open (or just closed) pull request in the admin view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub state: PullState,
}

/// Organization-wide share of one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStat {
    pub name: String,
    /// Rounded percentage, 0 to 100.
    pub percentage: u8,
    /// Display color as `#rrggbb`.
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_bytes_preserves_provider_order() {
        let languages: LanguageBytes =
            serde_json::from_str(r#"{"Rust": 300, "C": 20, "Shell": 5}"#).unwrap();

        let names: Vec<&str> = languages.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Rust", "C", "Shell"]);
        assert_eq!(languages.total(), 325);
    }

    #[test]
    fn test_language_bytes_serializes_as_map() {
        let languages: LanguageBytes = [("Go", 10u64), ("HTML", 2)].into_iter().collect();
        let json = serde_json::to_string(&languages).unwrap();
        assert_eq!(json, r#"{"Go":10,"HTML":2}"#);
    }

    #[test]
    fn test_language_bytes_merges_duplicate_names() {
        let mut languages = LanguageBytes::new();
        languages.add("Rust", 10);
        languages.add("Rust", 5);
        assert_eq!(languages.len(), 1);
        assert_eq!(languages.get("Rust"), Some(15));
    }

    #[test]
    fn test_commit_summary_and_short_sha() {
        let commit = Commit {
            message: "Add parser\n\nLonger body".to_string(),
            author: "dana".to_string(),
            date: Utc::now(),
            sha: "0123456789abcdef".to_string(),
            url: String::new(),
        };
        assert_eq!(commit.summary(), "Add parser");
        assert_eq!(commit.short_sha(), "0123456");
    }
}
