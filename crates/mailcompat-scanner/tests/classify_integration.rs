use mailcompat_core::{client_panel, FeatureType, Severity, SupportLevel};
use mailcompat_dataset::{parse_dataset, DatasetRegistry, ReferenceIndex};
use mailcompat_scanner::{
    check_html, classify, embed_links, extract_features, sort_issues, CompatibilityIssue,
    SupportResolution,
};
use std::collections::HashSet;

const DATASET: &str = r##"{
    "api_version": "1.0.4",
    "last_update_date": "2024-05-01 10:00:00 +0000",
    "nicenames": {
        "family": { "outlook": "Outlook", "gmail": "Gmail" },
        "platform": { "windows": "Windows", "desktop-webmail": "Desktop Webmail" },
        "support": { "supported": "Supported", "mitigated": "Partial support" },
        "category": { "css": "CSS", "html": "HTML" }
    },
    "data": [
        {
            "slug": "css-border-radius",
            "category": "css",
            "title": "border-radius",
            "keywords": "rounded corners",
            "stats": {
                "outlook": { "windows": { "2013": "n", "2019": "n" } },
                "gmail": { "desktop-webmail": { "2019-11": "y" } }
            }
        },
        {
            "slug": "css-display",
            "category": "css",
            "title": "display",
            "stats": {
                "outlook": { "windows": { "2019": "n" } },
                "gmail": { "desktop-webmail": { "2019-11": "a #1" } }
            },
            "notes_by_num": { "1": "Only in the body." }
        },
        {
            "slug": "css-at-media",
            "category": "css",
            "title": "@media",
            "stats": { "gmail": { "desktop-webmail": { "2019-11": "a" } } }
        },
        {
            "slug": "css-linear-gradient",
            "category": "css",
            "title": "linear-gradient()",
            "keywords": "linear-gradient",
            "stats": { "outlook": { "windows": { "2019": "n" } } }
        },
        {
            "slug": "html-table",
            "category": "html",
            "title": "<table> element",
            "stats": { "outlook": { "windows": { "2019": "y" } }, "gmail": { "desktop-webmail": { "2019": "y" } } }
        },
        {
            "slug": "html-width",
            "category": "html",
            "title": "width attribute",
            "stats": { "outlook": { "windows": { "2019": "a" } } }
        },
        {
            "slug": "css-width",
            "category": "css",
            "title": "width",
            "stats": { "gmail": { "desktop-webmail": { "2019": "y" } } }
        },
        { "slug": "broken-record", "category": "css" }
    ]
}"##;

const EMAIL: &str = r#"<!DOCTYPE html>
<html>
<head>
<style>
  @media (max-width: 600px) { .wrap { width: 100% !important; } }
  .btn { display: flex; background: -webkit-linear-gradient(top, #fff, #000); }
</style>
</head>
<body>
  <table width="600" role="presentation">
    <tr><td style="-webkit-border-radius: 4px; border-radius: 4px">Hello</td></tr>
  </table>
</body>
</html>"#;

fn index() -> ReferenceIndex {
    let dataset = parse_dataset(DATASET).expect("parse dataset");
    ReferenceIndex::from_dataset(&dataset)
}

fn find<'a>(issues: &'a [CompatibilityIssue], slug: &str) -> &'a CompatibilityIssue {
    issues
        .iter()
        .find(|issue| issue.slug() == slug)
        .unwrap_or_else(|| panic!("missing issue {slug}"))
}

#[test]
fn test_border_radius_single_issue() {
    let report = check_html(
        r#"<div style="border-radius:4px">x</div>"#,
        &index(),
        true,
    );

    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.property, "border-radius");
    assert_eq!(issue.feature_type, FeatureType::Css);
    assert_eq!(issue.severity, Severity::Error);

    let unsupported: Vec<&str> = issue.summary.unsupported.iter().map(|c| c.label).collect();
    let supported: Vec<&str> = issue.summary.supported.iter().map(|c| c.label).collect();
    assert_eq!(unsupported, vec!["Outlook Windows"]);
    assert_eq!(supported, vec!["Gmail"]);
}

#[test]
fn test_full_document() {
    let index = index();
    let report = check_html(EMAIL, &index, true);

    let slugs: Vec<&str> = report.issues.iter().map(CompatibilityIssue::slug).collect();
    assert_eq!(
        slugs,
        vec![
            "css-border-radius",
            "css-display",
            "css-linear-gradient",
            "css-at-media",
            "html-width",
            "css-width",
            "html-table",
        ]
    );

    let display = find(&report.issues, "css-display");
    assert_eq!(display.property, "display");
    assert_eq!(display.severity, Severity::Error);
    let gmail = display
        .details
        .iter()
        .find(|detail| detail.client.label == "Gmail")
        .expect("gmail detail");
    assert_eq!(
        gmail.resolution,
        SupportResolution::Recorded {
            level: SupportLevel::Partial,
            version: "2019-11".to_string(),
            note: Some("Only in the body.".to_string()),
        }
    );

    let media = find(&report.issues, "css-at-media");
    assert_eq!(media.feature_type, FeatureType::CssAtRule);
    assert_eq!(media.property, "@media");
    assert_eq!(media.severity, Severity::Warning);

    let table = find(&report.issues, "html-table");
    assert_eq!(table.property, "<table>");
    assert_eq!(table.severity, Severity::Success);

    assert_eq!(report.counts.error, 3);
    assert_eq!(report.counts.warning, 2);
    assert_eq!(report.counts.success, 2);
}

#[test]
fn test_issue_invariants() {
    let index = index();
    let issues = classify(&extract_features(EMAIL), &index);

    let slugs: HashSet<&str> = issues.iter().map(CompatibilityIssue::slug).collect();
    assert_eq!(slugs.len(), issues.len(), "one issue per slug");

    for issue in &issues {
        assert_eq!(issue.summary.len(), client_panel().len());
        assert_eq!(issue.details.len(), client_panel().len());

        let expected = if !issue.summary.unsupported.is_empty() {
            Severity::Error
        } else if !issue.summary.partial.is_empty() {
            Severity::Warning
        } else {
            Severity::Success
        };
        assert_eq!(issue.severity, expected, "severity of {}", issue.slug());
    }
}

#[test]
fn test_sort_is_stable_across_runs() {
    let index = index();
    let mut first = classify(&extract_features(EMAIL), &index);
    let mut second = classify(&extract_features(EMAIL), &index);
    sort_issues(&mut first);
    sort_issues(&mut second);

    let first: Vec<&str> = first.iter().map(CompatibilityIssue::slug).collect();
    let second: Vec<&str> = second.iter().map(CompatibilityIssue::slug).collect();
    assert_eq!(first, second);
}

#[test]
fn test_report_serializes_with_links() {
    let registry = DatasetRegistry::new();
    let snapshot = registry.install(parse_dataset(DATASET).expect("parse dataset"));

    let report = check_html(EMAIL, &snapshot.index, true);
    let links = embed_links("https://embed.caniemail.com/", &report.issues);
    assert_eq!(links[0].url, "https://embed.caniemail.com/css-border-radius/");

    let json = serde_json::to_value(&report).expect("serialize report");
    let first = &json["issues"][0];
    assert_eq!(first["featureType"], "css");
    assert_eq!(first["severity"], "error");
    assert_eq!(first["feature"]["slug"], "css-border-radius");
    assert_eq!(json["counts"]["error"], 3);
}
