//! Reference dataset types.
//!
//! This module defines the feature-support records loaded from the external
//! JSON dataset, plus the dataset envelope that carries them.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Category a reference feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    /// CSS properties, functions and at-rules
    Css,
    /// HTML elements and attributes
    Html,
    /// Image formats
    Image,
    /// Everything else (AMP, BIMI, ...)
    Others,
    /// A category this build does not know about
    #[serde(other)]
    Unknown,
}

/// Per-platform support history, in the order the dataset lists it.
///
/// The dataset records versions chronologically, so the last entry is the
/// most recent observation. Non-string codes are kept as their JSON text
/// so they later degrade to an unknown support level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHistory(Vec<(String, String)>);

impl VersionHistory {
    /// Build a history from (version, raw support code) pairs.
    #[must_use]
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }

    /// The most recently recorded (version, raw support code) pair.
    #[must_use]
    pub fn latest(&self) -> Option<(&str, &str)> {
        self.0
            .last()
            .map(|(version, code)| (version.as_str(), code.as_str()))
    }

    /// Iterate (version, raw support code) pairs in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(version, code)| (version.as_str(), code.as_str()))
    }

    /// Number of recorded versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no version is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for VersionHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HistoryVisitor;

        impl<'de> Visitor<'de> for HistoryVisitor {
            type Value = VersionHistory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of version to support code")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VersionHistory::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((version, code)) = map.next_entry::<String, serde_json::Value>()? {
                    let code = match code {
                        serde_json::Value::String(code) => code,
                        other => other.to_string(),
                    };
                    entries.push((version, code));
                }
                Ok(VersionHistory(entries))
            }
        }

        deserializer.deserialize_any(HistoryVisitor)
    }
}

impl Serialize for VersionHistory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (version, code) in &self.0 {
            map.serialize_entry(version, code)?;
        }
        map.end()
    }
}

/// Support matrix: client family → platform → version history.
pub type SupportStats = HashMap<String, HashMap<String, VersionHistory>>;

/// One compatibility record from the reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceFeature {
    /// Stable unique identifier (e.g. `css-border-radius`)
    pub slug: String,

    /// Feature category
    pub category: FeatureCategory,

    /// Human label (e.g. `border-radius`, `<table> element`)
    pub title: String,

    /// Comma-separated alias list
    #[serde(default)]
    pub keywords: Option<String>,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Canonical page for the feature
    #[serde(default)]
    pub url: Option<String>,

    /// Support matrix
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: SupportStats,

    /// Footnote number → footnote text
    #[serde(
        default,
        alias = "notes_by_num",
        deserialize_with = "null_as_default"
    )]
    pub notes_by_num: HashMap<String, String>,
}

impl ReferenceFeature {
    /// Lowercased, trimmed, non-empty keywords in listed order.
    pub fn keyword_list(&self) -> impl Iterator<Item = String> + '_ {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
    }

    /// Support history for one (family, platform) cell, if recorded.
    #[must_use]
    pub fn history(&self, family: &str, platform: &str) -> Option<&VersionHistory> {
        self.stats.get(family)?.get(platform)
    }

    /// Resolve a footnote by number.
    #[must_use]
    pub fn note(&self, number: &str) -> Option<&str> {
        self.notes_by_num.get(number).map(String::as_str)
    }
}

/// Display-name tables shipped alongside the features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Nicenames {
    /// Client family key → display name
    pub family: HashMap<String, String>,
    /// Platform key → display name
    pub platform: HashMap<String, String>,
    /// Support code → display name
    pub support: HashMap<String, String>,
    /// Category key → display name
    pub category: HashMap<String, String>,
}

/// A loaded reference dataset. Immutable once built; a refresh replaces it
/// wholesale.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDataset {
    /// Upstream API version, not validated
    pub api_version: Option<String>,
    /// Upstream last-update date, not validated
    pub last_update_date: Option<String>,
    /// Display-name tables
    pub nicenames: Nicenames,
    /// Feature records in dataset order
    #[serde(rename = "data")]
    pub features: Vec<Arc<ReferenceFeature>>,
}

impl ReferenceDataset {
    /// Build a dataset from bare feature records.
    #[must_use]
    pub fn from_features(features: Vec<ReferenceFeature>) -> Self {
        Self {
            features: features.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }

    /// Number of feature records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the dataset has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Find a feature by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Arc<ReferenceFeature>> {
        self.features.iter().find(|feature| feature.slug == slug)
    }

    /// Display name for a client family, falling back to the key.
    #[must_use]
    pub fn family_name<'a>(&'a self, family: &'a str) -> &'a str {
        self.nicenames
            .family
            .get(family)
            .map_or(family, String::as_str)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
