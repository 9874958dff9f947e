//! Mailcompat Scanner - Email HTML compatibility checking.
//!
//! This crate reads an HTML email, pulls out every CSS property, at-rule,
//! HTML element and attribute it uses, and checks each against the reference
//! dataset for a fixed panel of email clients.
//!
//! # Pipeline
//!
//! 1. [`extract_features`] scans the markup and parses the CSS it contains
//!    (falling back to a lenient scan on malformed CSS)
//! 2. [`classify`] looks identifiers up in a [`ReferenceIndex`], resolves
//!    the latest support per client and emits one issue per feature
//! 3. [`sort_issues`] orders issues for display
//!
//! None of these steps fail: malformed input yields fewer identifiers, and
//! unknown identifiers are skipped.
//!
//! # Example
//!
//! ```rust
//! use mailcompat_core::Severity;
//! use mailcompat_dataset::{parse_dataset, ReferenceIndex};
//! use mailcompat_scanner::check_html;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = parse_dataset(r#"{"data": [{
//!     "slug": "css-border-radius",
//!     "category": "css",
//!     "title": "border-radius",
//!     "stats": { "outlook": { "windows": { "2019": "n" } } }
//! }]}"#)?;
//! let index = ReferenceIndex::from_dataset(&dataset);
//!
//! let report = check_html(r#"<div style="border-radius:4px">x</div>"#, &index, true);
//! assert_eq!(report.issues.len(), 1);
//! assert_eq!(report.issues[0].severity, Severity::Error);
//! # Ok(())
//! # }
//! ```
//!
//! [`ReferenceIndex`]: mailcompat_dataset::ReferenceIndex

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod css;
pub mod embed;
pub mod error;
pub mod extractor;
pub mod resolver;
pub mod value_features;

// Re-export commonly used types
pub use classifier::{
    check_html, classify, classify_with_panel, sort_issues, summarize_support, ClientSupport,
    CompatibilityIssue, CompatibilityReport, SeverityCounts, SupportSummary,
};
pub use css::{parse_stylesheet, scan_lenient, CssNode, LenientScan, MAX_NESTING_DEPTH};
pub use embed::{embed_links, embed_url, EmbedLink};
pub use error::{CssParseError, Result};
pub use extractor::{extract_features, ExtractedFeatures};
pub use resolver::{resolve_support, SupportResolution};
pub use value_features::{value_features_in, VALUE_FEATURES};
