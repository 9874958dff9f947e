//! Process-wide holder for the current reference dataset snapshot.
//!
//! The registry never fetches or refreshes data itself. An external fetcher
//! installs a freshly loaded dataset; readers take an `Arc` to whichever
//! snapshot is current and keep using it even if it is replaced meanwhile.

use crate::{
    definition::ReferenceDataset,
    error::{DatasetError, Result},
    index::ReferenceIndex,
};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// An immutable dataset together with the index built from it.
#[derive(Debug)]
pub struct DatasetSnapshot {
    /// The loaded dataset
    pub dataset: ReferenceDataset,
    /// Lookup index built once from `dataset`
    pub index: ReferenceIndex,
    /// When this snapshot was installed
    pub loaded_at: Instant,
}

impl DatasetSnapshot {
    /// Build a snapshot, indexing the dataset.
    #[must_use]
    pub fn new(dataset: ReferenceDataset) -> Self {
        let index = ReferenceIndex::from_dataset(&dataset);
        Self {
            dataset,
            index,
            loaded_at: Instant::now(),
        }
    }

    /// Whether this snapshot is older than the validity window.
    #[must_use]
    pub fn is_expired(&self, validity: Duration) -> bool {
        self.loaded_at.elapsed() >= validity
    }
}

/// Swappable holder of the current [`DatasetSnapshot`].
#[derive(Clone, Default)]
pub struct DatasetRegistry {
    current: Arc<RwLock<Option<Arc<DatasetSnapshot>>>>,
}

impl DatasetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `dataset` and make it the current snapshot, replacing any
    /// previous one wholesale.
    pub fn install(&self, dataset: ReferenceDataset) -> Arc<DatasetSnapshot> {
        let snapshot = Arc::new(DatasetSnapshot::new(dataset));

        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let replaced = current.replace(Arc::clone(&snapshot)).is_some();

        info!(
            features = snapshot.dataset.len(),
            replaced, "installed reference dataset snapshot"
        );

        snapshot
    }

    /// Get the current snapshot.
    ///
    /// # Errors
    /// Returns [`DatasetError::NotLoaded`] if nothing has been installed.
    pub fn snapshot(&self) -> Result<Arc<DatasetSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DatasetError::NotLoaded)
    }

    /// Whether the external fetcher should install a new snapshot: nothing
    /// is loaded yet, or the current one is past its validity window.
    #[must_use]
    pub fn is_stale(&self, validity: Duration) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(true, |snapshot| snapshot.is_expired(validity))
    }

    /// Drop the current snapshot.
    pub fn clear(&self) {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{FeatureCategory, ReferenceFeature};
    use std::collections::HashMap;

    fn dataset(slugs: &[&str]) -> ReferenceDataset {
        ReferenceDataset::from_features(
            slugs
                .iter()
                .map(|slug| ReferenceFeature {
                    slug: (*slug).to_string(),
                    category: FeatureCategory::Css,
                    title: slug.trim_start_matches("css-").to_string(),
                    keywords: None,
                    description: None,
                    url: None,
                    stats: HashMap::new(),
                    notes_by_num: HashMap::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = DatasetRegistry::new();
        assert!(matches!(registry.snapshot(), Err(DatasetError::NotLoaded)));
        assert!(registry.is_stale(Duration::from_secs(3600)));
    }

    #[test]
    fn test_install_and_snapshot() {
        let registry = DatasetRegistry::new();
        registry.install(dataset(&["css-color"]));

        let snapshot = registry.snapshot().expect("snapshot installed");
        assert_eq!(snapshot.dataset.len(), 1);
        assert!(snapshot.index.css_feature("color").is_some());
        assert!(!registry.is_stale(Duration::from_secs(3600)));
        assert!(registry.is_stale(Duration::ZERO));
    }

    #[test]
    fn test_install_replaces_wholesale() {
        let registry = DatasetRegistry::new();
        registry.install(dataset(&["css-color"]));
        let old = registry.snapshot().expect("first snapshot");

        registry.install(dataset(&["css-margin", "css-padding"]));
        let new = registry.snapshot().expect("second snapshot");

        // Readers holding the old snapshot still see a consistent view.
        assert!(old.index.css_feature("color").is_some());
        assert!(old.index.css_feature("margin").is_none());

        assert!(new.index.css_feature("color").is_none());
        assert_eq!(new.dataset.len(), 2);
    }

    #[test]
    fn test_clear() {
        let registry = DatasetRegistry::new();
        registry.install(dataset(&["css-color"]));
        registry.clear();
        assert!(registry.snapshot().is_err());
    }
}
