//! Turn extracted identifiers into deduplicated compatibility issues.

use crate::extractor::{extract_features, ExtractedFeatures};
use crate::resolver::{resolve_support, SupportResolution};
use mailcompat_core::{client_panel, ClientDescriptor, FeatureType, Severity, SupportLevel};
use mailcompat_dataset::{ReferenceFeature, ReferenceIndex};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Client panel partitioned by support level. Every client lands in exactly
/// one bucket; missing data and explicit `unknown` both go to `unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportSummary {
    /// Latest recorded code is `y`
    pub supported: Vec<ClientDescriptor>,
    /// Latest recorded code is `a`
    pub partial: Vec<ClientDescriptor>,
    /// Latest recorded code is `n`
    pub unsupported: Vec<ClientDescriptor>,
    /// `u`, unparseable code, or no data for the client
    pub unknown: Vec<ClientDescriptor>,
}

impl SupportSummary {
    fn push(&mut self, client: ClientDescriptor, level: SupportLevel) {
        match level {
            SupportLevel::Yes => self.supported.push(client),
            SupportLevel::Partial => self.partial.push(client),
            SupportLevel::No => self.unsupported.push(client),
            SupportLevel::Unknown => self.unknown.push(client),
        }
    }

    /// `error` if any client lacks support, else `warning` if any has
    /// partial support, else `success`.
    #[must_use]
    pub fn severity(&self) -> Severity {
        if !self.unsupported.is_empty() {
            Severity::Error
        } else if !self.partial.is_empty() {
            Severity::Warning
        } else {
            Severity::Success
        }
    }

    /// Total clients across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.supported.len() + self.partial.len() + self.unsupported.len() + self.unknown.len()
    }

    /// Whether the summary covers no clients (an empty panel).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolution for one client, kept so renderers can show versions and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSupport {
    /// Panel entry
    pub client: ClientDescriptor,
    /// Latest support for that entry
    pub resolution: SupportResolution,
}

/// One reported feature.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityIssue {
    /// Reference record the identifier resolved to
    pub feature: Arc<ReferenceFeature>,
    /// Category the identifier was found in
    pub feature_type: FeatureType,
    /// Identifier as matched in the document; elements are shown as `<tag>`
    pub property: String,
    /// Worst support gap across the panel
    pub severity: Severity,
    /// Panel partitioned by support level
    pub summary: SupportSummary,
    /// Per-client resolution in panel order
    pub details: Vec<ClientSupport>,
}

impl CompatibilityIssue {
    /// Slug of the underlying feature.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.feature.slug
    }
}

/// Resolve `feature` against every client of `panel`.
#[must_use]
pub fn summarize_support(
    feature: &ReferenceFeature,
    panel: &[ClientDescriptor],
) -> (SupportSummary, Vec<ClientSupport>) {
    let mut summary = SupportSummary::default();
    let mut details = Vec::with_capacity(panel.len());

    for client in panel {
        let resolution = resolve_support(feature, client.family, client.platform);
        summary.push(*client, resolution.level());
        details.push(ClientSupport {
            client: *client,
            resolution,
        });
    }

    (summary, details)
}

/// Classify extracted identifiers against the compiled-in client panel.
#[must_use]
pub fn classify(extracted: &ExtractedFeatures, index: &ReferenceIndex) -> Vec<CompatibilityIssue> {
    classify_with_panel(extracted, index, client_panel())
}

/// Classify extracted identifiers against an explicit panel.
///
/// Categories are visited in a fixed order (CSS properties, at-rules,
/// elements, attributes). A feature is emitted once: the first identifier
/// resolving to a slug claims it, across all categories.
#[must_use]
pub fn classify_with_panel(
    extracted: &ExtractedFeatures,
    index: &ReferenceIndex,
    panel: &[ClientDescriptor],
) -> Vec<CompatibilityIssue> {
    let mut emitted = HashSet::new();
    let mut issues = Vec::new();

    for (feature_type, identifiers) in extracted.identifier_sets() {
        for identifier in identifiers {
            let Some(feature) = index.lookup(feature_type, identifier) else {
                continue;
            };
            if !emitted.insert(feature.slug.as_str()) {
                continue;
            }

            let (summary, details) = summarize_support(feature, panel);
            issues.push(CompatibilityIssue {
                feature: Arc::clone(feature),
                feature_type,
                property: format_identifier(feature_type, identifier),
                severity: summary.severity(),
                summary,
                details,
            });
        }
    }

    debug!(issues = issues.len(), "classified document features");
    issues
}

fn format_identifier(feature_type: FeatureType, identifier: &str) -> String {
    match feature_type {
        FeatureType::HtmlElement => format!("<{identifier}>"),
        _ => identifier.to_string(),
    }
}

/// Order issues by severity (errors first) then slug.
pub fn sort_issues(issues: &mut [CompatibilityIssue]) {
    issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.feature.slug.cmp(&b.feature.slug))
    });
}

/// Number of issues per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Issues with at least one unsupported client
    pub error: usize,
    /// Issues with partial support somewhere
    pub warning: usize,
    /// Issues supported or untracked everywhere
    pub success: usize,
}

/// Classification result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    /// One issue per distinct feature
    pub issues: Vec<CompatibilityIssue>,
    /// Tally of `issues` by severity
    pub counts: SeverityCounts,
}

impl CompatibilityReport {
    /// Wrap `issues`, counting them by severity.
    #[must_use]
    pub fn new(issues: Vec<CompatibilityIssue>) -> Self {
        let mut counts = SeverityCounts::default();
        for issue in &issues {
            match issue.severity {
                Severity::Error => counts.error += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Success => counts.success += 1,
            }
        }
        Self { issues, counts }
    }

    /// Highest severity among the issues, `None` when there are none.
    #[must_use]
    pub fn worst_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|issue| issue.severity).max()
    }
}

/// Extract and classify one HTML document.
#[must_use]
pub fn check_html(html: &str, index: &ReferenceIndex, sort: bool) -> CompatibilityReport {
    let extracted = extract_features(html);
    let mut issues = classify(&extracted, index);
    if sort {
        sort_issues(&mut issues);
    }
    CompatibilityReport::new(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailcompat_dataset::{FeatureCategory, ReferenceDataset, VersionHistory};
    use std::collections::{BTreeSet, HashMap};

    const PANEL: &[ClientDescriptor] = &[
        ClientDescriptor {
            family: "gmail",
            platform: "desktop-webmail",
            label: "Gmail",
        },
        ClientDescriptor {
            family: "outlook",
            platform: "windows",
            label: "Outlook Windows",
        },
        ClientDescriptor {
            family: "yahoo",
            platform: "desktop-webmail",
            label: "Yahoo! Mail",
        },
    ];

    fn feature(
        slug: &str,
        category: FeatureCategory,
        title: &str,
        keywords: Option<&str>,
        stats: &[(&str, &str, &str)],
    ) -> ReferenceFeature {
        let mut matrix: HashMap<String, HashMap<String, VersionHistory>> = HashMap::new();
        for (family, platform, code) in stats {
            matrix.entry((*family).to_string()).or_default().insert(
                (*platform).to_string(),
                VersionHistory::new(vec![("2024".to_string(), (*code).to_string())]),
            );
        }
        ReferenceFeature {
            slug: slug.to_string(),
            category,
            title: title.to_string(),
            keywords: keywords.map(str::to_string),
            description: None,
            url: None,
            stats: matrix,
            notes_by_num: HashMap::new(),
        }
    }

    fn index(features: Vec<ReferenceFeature>) -> ReferenceIndex {
        ReferenceIndex::from_dataset(&ReferenceDataset::from_features(features))
    }

    fn labels(clients: &[ClientDescriptor]) -> Vec<&str> {
        clients.iter().map(|client| client.label).collect()
    }

    #[test]
    fn test_summary_buckets_and_severity() {
        let flex = feature(
            "css-display-flex",
            FeatureCategory::Css,
            "display:flex",
            None,
            &[
                ("gmail", "desktop-webmail", "y"),
                ("outlook", "windows", "a #1"),
                ("yahoo", "desktop-webmail", "u"),
            ],
        );

        let (summary, details) = summarize_support(&flex, PANEL);
        assert_eq!(labels(&summary.supported), vec!["Gmail"]);
        assert_eq!(labels(&summary.partial), vec!["Outlook Windows"]);
        assert!(summary.unsupported.is_empty());
        assert_eq!(labels(&summary.unknown), vec!["Yahoo! Mail"]);
        assert_eq!(summary.len(), PANEL.len());
        assert_eq!(details.len(), PANEL.len());
        assert_eq!(summary.severity(), Severity::Warning);
    }

    #[test]
    fn test_untracked_feature_is_success() {
        let bare = feature("css-color", FeatureCategory::Css, "color", None, &[]);
        let (summary, _) = summarize_support(&bare, PANEL);

        assert_eq!(summary.unknown.len(), PANEL.len());
        assert_eq!(summary.severity(), Severity::Success);
    }

    #[test]
    fn test_unsupported_takes_precedence() {
        let grid = feature(
            "css-display-grid",
            FeatureCategory::Css,
            "display:grid",
            None,
            &[("gmail", "desktop-webmail", "a"), ("outlook", "windows", "n")],
        );
        let (summary, _) = summarize_support(&grid, PANEL);
        assert_eq!(summary.severity(), Severity::Error);
    }

    #[test]
    fn test_dedup_across_categories_keeps_first_category() {
        // html-style is reachable both as the <style> element and, through
        // its keyword, as the style attribute.
        let index = index(vec![
            feature("css-width", FeatureCategory::Css, "width", None, &[]),
            feature("html-style", FeatureCategory::Html, "<style> element", Some("style"), &[]),
            feature("html-width", FeatureCategory::Html, "width attribute", None, &[]),
        ]);

        let extracted = ExtractedFeatures {
            css_properties: BTreeSet::from(["width".to_string()]),
            html_elements: BTreeSet::from(["style".to_string()]),
            html_attributes: BTreeSet::from(["style".to_string(), "width".to_string()]),
            ..ExtractedFeatures::default()
        };

        let issues = classify_with_panel(&extracted, &index, PANEL);
        let slugs: Vec<&str> = issues.iter().map(CompatibilityIssue::slug).collect();
        assert_eq!(slugs, vec!["css-width", "html-style", "html-width"]);

        assert_eq!(issues[0].feature_type, FeatureType::Css);
        assert_eq!(issues[1].feature_type, FeatureType::HtmlElement);
        assert_eq!(issues[1].property, "<style>");
        assert_eq!(issues[2].feature_type, FeatureType::HtmlAttribute);
        assert_eq!(issues[2].property, "width");
    }

    #[test]
    fn test_unknown_identifiers_are_skipped() {
        let index = index(vec![feature("css-color", FeatureCategory::Css, "color", None, &[])]);
        let extracted = ExtractedFeatures {
            css_properties: BTreeSet::from(["mso-line-height-rule".to_string()]),
            css_at_rules: BTreeSet::from(["@font-face".to_string()]),
            ..ExtractedFeatures::default()
        };

        assert!(classify_with_panel(&extracted, &index, PANEL).is_empty());
    }

    #[test]
    fn test_sort_and_report_counts() {
        let index = index(vec![
            feature("css-color", FeatureCategory::Css, "color", None, &[("gmail", "desktop-webmail", "y")]),
            feature("css-margin", FeatureCategory::Css, "margin", None, &[("outlook", "windows", "a")]),
            feature("css-display", FeatureCategory::Css, "display", None, &[("outlook", "windows", "n")]),
            feature("css-background", FeatureCategory::Css, "background", None, &[("yahoo", "desktop-webmail", "n")]),
        ]);

        let html = r#"<p style="color:red;margin:0;display:block;background:#fff">x</p>"#;
        let report = check_html(html, &index, true);

        let slugs: Vec<&str> = report.issues.iter().map(CompatibilityIssue::slug).collect();
        assert_eq!(
            slugs,
            vec!["css-background", "css-display", "css-margin", "css-color"]
        );
        assert_eq!(
            report.counts,
            SeverityCounts {
                error: 2,
                warning: 1,
                success: 1
            }
        );
        assert_eq!(report.worst_severity(), Some(Severity::Error));
    }

    #[test]
    fn test_empty_report() {
        let report = check_html("<p>plain</p>", &ReferenceIndex::default(), true);
        assert!(report.issues.is_empty());
        assert_eq!(report.counts, SeverityCounts::default());
        assert_eq!(report.worst_severity(), None);
    }
}
