//! Links to the public support table of each feature.

use crate::classifier::CompatibilityIssue;
use serde::Serialize;

/// Public support-table page for a feature: `{base}/{slug}/`.
#[must_use]
pub fn embed_url(base_url: &str, slug: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let slug = slug.trim_matches('/');
    format!("{base}/{slug}/")
}

/// Issue slug paired with its support-table page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedLink {
    /// Feature slug
    pub slug: String,
    /// `{base}/{slug}/`
    pub url: String,
}

/// Links for every issue, in issue order.
#[must_use]
pub fn embed_links(base_url: &str, issues: &[CompatibilityIssue]) -> Vec<EmbedLink> {
    issues
        .iter()
        .map(|issue| EmbedLink {
            slug: issue.slug().to_string(),
            url: embed_url(base_url, issue.slug()),
        })
        .collect()
}
