//! Mailcompat Dataset - Reference feature-support data for email clients.
//!
//! This crate owns the reference dataset: the feature records that say how
//! well each email client supports a CSS property, at-rule, HTML element or
//! attribute. It loads the JSON dataset, builds the lookup index the scanner
//! resolves identifiers against, and keeps the current snapshot.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Reference feature records and the dataset envelope
//! - **Loader** ([`loader`]): JSON loading with per-record tolerance
//! - **Index** ([`index`]): Identifier → feature mappings (CSS, HTML element, HTML attribute)
//! - **Registry** ([`registry`]): Swappable, read-only snapshot of dataset + index
//! - **Errors** ([`error`]): Dataset-specific error types
//!
//! # Example
//!
//! ```rust
//! use mailcompat_dataset::{parse_dataset, DatasetRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = parse_dataset(r#"{
//!     "data": [{
//!         "slug": "css-border-radius",
//!         "category": "css",
//!         "title": "border-radius",
//!         "stats": { "outlook": { "windows": { "2019": "n" } } }
//!     }]
//! }"#)?;
//!
//! let registry = DatasetRegistry::new();
//! let snapshot = registry.install(dataset);
//! assert!(snapshot.index.css_feature("border-radius").is_some());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod index;
pub mod loader;
pub mod registry;

// Re-export commonly used types
pub use definition::{
    FeatureCategory, Nicenames, ReferenceDataset, ReferenceFeature, SupportStats, VersionHistory,
};
pub use error::{DatasetError, Result};
pub use index::ReferenceIndex;
pub use loader::{parse_dataset, DatasetLoader};
pub use registry::{DatasetRegistry, DatasetSnapshot};
