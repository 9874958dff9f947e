//! Reference dataset loading from JSON.
//!
//! Downloading and revalidating the dataset is the job of an external
//! fetcher; this module only turns a local copy (file or string) into a
//! [`ReferenceDataset`].

use crate::{
    definition::{Nicenames, ReferenceDataset, ReferenceFeature},
    error::{DatasetError, Result},
};
use mailcompat_core::{AppConfig, DatasetConfig};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name used for the dataset copy inside the cache directory.
pub const DEFAULT_DATASET_FILE: &str = "data.json";

/// Envelope with feature records left unparsed so one bad record cannot
/// reject the whole dataset.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    #[serde(default, alias = "api_version")]
    api_version: Option<serde_json::Value>,
    #[serde(default, alias = "last_update_date")]
    last_update_date: Option<serde_json::Value>,
    #[serde(default)]
    nicenames: Option<Nicenames>,
    #[serde(default)]
    data: Vec<Box<RawValue>>,
}

/// Loader for the reference dataset from a JSON file.
pub struct DatasetLoader {
    /// Path to the dataset JSON
    path: PathBuf,
}

impl DatasetLoader {
    /// Create a new loader for the given dataset file.
    ///
    /// # Errors
    /// Returns error if the file doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.is_file() {
            return Err(DatasetError::NotFound {
                path: path.display().to_string(),
            });
        }

        Ok(Self { path })
    }

    /// Create a loader from configuration: the configured `cache_path`, or
    /// `data.json` inside the XDG cache directory.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        let path = match &config.cache_path {
            Some(path) => path.clone(),
            None => AppConfig::cache_dir()?.join(DEFAULT_DATASET_FILE),
        };
        Self::new(path)
    }

    /// Path this loader reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the dataset file.
    ///
    /// Malformed or duplicate feature records are logged as warnings and skipped.
    pub fn load(&self) -> Result<ReferenceDataset> {
        let contents = std::fs::read_to_string(&self.path)?;
        parse_named(&contents, &self.path.display().to_string())
    }
}

/// Parse a dataset from a JSON string.
///
/// Malformed or duplicate feature records are logged as warnings and skipped.
pub fn parse_dataset(json: &str) -> Result<ReferenceDataset> {
    parse_named(json, "<inline>")
}

fn parse_named(json: &str, source_name: &str) -> Result<ReferenceDataset> {
    let raw: RawDataset =
        serde_json::from_str(json).map_err(|source| DatasetError::ParseError {
            source_name: source_name.to_string(),
            source,
        })?;

    let mut seen = HashSet::new();
    let mut features = Vec::with_capacity(raw.data.len());

    for (position, record) in raw.data.iter().enumerate() {
        let feature = match serde_json::from_str::<ReferenceFeature>(record.get()) {
            Ok(feature) => feature,
            Err(e) => {
                warn!(position, error = %e, "skipping malformed feature record");
                continue;
            }
        };

        if !seen.insert(feature.slug.clone()) {
            warn!(slug = %feature.slug, position, "skipping duplicate feature slug");
            continue;
        }

        debug!(slug = %feature.slug, "loaded feature record");
        features.push(Arc::new(feature));
    }

    info!(
        count = features.len(),
        source = source_name,
        "loaded reference dataset"
    );

    Ok(ReferenceDataset {
        api_version: raw.api_version.map(value_to_string),
        last_update_date: raw.last_update_date.map(value_to_string),
        nicenames: raw.nicenames.unwrap_or_default(),
        features,
    })
}

fn value_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}
