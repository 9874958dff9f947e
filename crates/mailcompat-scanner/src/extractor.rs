//! Feature extraction from raw email HTML.
//!
//! Email markup is often invalid, so nothing here builds a DOM. Style
//! attributes, `<style>` blocks, tags and attributes are located by pattern
//! scans over the text; only the CSS inside them gets a structural parse,
//! with a lenient fallback when that fails. Extraction never fails.

use crate::css::{parse_stylesheet, scan_lenient, CssNode};
use crate::value_features::value_features_in;
use mailcompat_core::FeatureType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

static STYLE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\sstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid style attribute regex")
});

static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").expect("valid style block regex")
});

static OPENING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9:-]*)").expect("valid opening tag regex"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s([a-zA-Z_:][a-zA-Z0-9_:.-]*)\s*=").expect("valid attribute regex")
});

static MEDIA_FEATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*([a-z-]+)\s*[:,)]").expect("valid media feature regex"));

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// Identifiers found in one document.
///
/// Sets hold lowercase strings. Their iteration order is sorted, which makes
/// repeated extraction of the same input produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFeatures {
    /// CSS properties (vendor prefixes removed) and synthetic value features
    pub css_properties: BTreeSet<String>,
    /// `@name` at-rules and `@media (feature)` sub-keys
    pub css_at_rules: BTreeSet<String>,
    /// Tag names
    pub html_elements: BTreeSet<String>,
    /// Attribute names
    pub html_attributes: BTreeSet<String>,
    /// Raw lowercased values seen per (unprefixed) property
    pub css_values: BTreeMap<String, BTreeSet<String>>,
}

impl ExtractedFeatures {
    /// The four identifier sets in classification order.
    #[must_use]
    pub fn identifier_sets(&self) -> [(FeatureType, &BTreeSet<String>); 4] {
        [
            (FeatureType::Css, &self.css_properties),
            (FeatureType::CssAtRule, &self.css_at_rules),
            (FeatureType::HtmlElement, &self.html_elements),
            (FeatureType::HtmlAttribute, &self.html_attributes),
        ]
    }

    /// Whether nothing at all was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifier_sets().iter().all(|(_, set)| set.is_empty())
    }

    fn collect_css(&mut self, css: &str, origin: &'static str) {
        match parse_stylesheet(css) {
            Ok(nodes) => self.collect_nodes(&nodes),
            Err(e) => {
                debug!(origin, error = %e, "CSS did not parse, falling back to lenient scan");
                let scan = scan_lenient(css);
                for (property, value) in scan.declarations {
                    self.record_value(&property, value);
                    self.css_properties.insert(property);
                }
                for name in scan.at_rules {
                    self.css_at_rules.insert(format!("@{name}"));
                }
            }
        }
    }

    fn collect_nodes(&mut self, nodes: &[CssNode]) {
        for node in nodes {
            match node {
                CssNode::Declaration { property, value } => {
                    self.record_declaration(property, value);
                }
                CssNode::AtRule {
                    name,
                    params,
                    children,
                } => {
                    self.record_at_rule(name, params);
                    self.collect_nodes(children);
                }
                CssNode::Rule { children, .. } => self.collect_nodes(children),
            }
        }
    }

    fn record_declaration(&mut self, property: &str, value: &str) {
        let property = property.to_lowercase();
        let property = strip_vendor_prefix(&property);
        self.record_value(property, value.to_lowercase());
        self.css_properties.insert(property.to_string());
    }

    fn record_value(&mut self, property: &str, value: String) {
        self.css_values
            .entry(property.to_string())
            .or_default()
            .insert(value);
    }

    fn record_at_rule(&mut self, name: &str, params: &str) {
        let name = name.to_lowercase();
        self.css_at_rules.insert(format!("@{name}"));

        match name.as_str() {
            "media" => {
                let params = params.to_lowercase();
                for caps in MEDIA_FEATURE.captures_iter(&params) {
                    self.css_at_rules.insert(format!("@media ({})", &caps[1]));
                }
            }
            "supports" => {
                self.css_at_rules.insert("@supports".to_string());
            }
            _ => {}
        }
    }

    fn derive_value_features(&mut self) {
        for values in self.css_values.values() {
            for value in values {
                for name in value_features_in(value) {
                    self.css_properties.insert(name.to_string());
                }
            }
        }
    }
}

fn strip_vendor_prefix(property: &str) -> &str {
    VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| property.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(property)
}

/// Scan an HTML document for every CSS property, at-rule, element and
/// attribute it uses.
#[must_use]
pub fn extract_features(html: &str) -> ExtractedFeatures {
    let mut features = ExtractedFeatures::default();

    for caps in STYLE_ATTRIBUTE.captures_iter(html) {
        let style = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        features.collect_css(&format!("* {{ {style} }}"), "style attribute");
    }

    for caps in STYLE_BLOCK.captures_iter(html) {
        features.collect_css(&caps[1], "style block");
    }

    features.derive_value_features();

    for caps in OPENING_TAG.captures_iter(html) {
        features.html_elements.insert(caps[1].to_lowercase());
    }

    for caps in ATTRIBUTE.captures_iter(html) {
        features.html_attributes.insert(caps[1].to_lowercase());
    }

    debug!(
        css_properties = features.css_properties.len(),
        css_at_rules = features.css_at_rules.len(),
        html_elements = features.html_elements.len(),
        html_attributes = features.html_attributes.len(),
        "extracted features"
    );

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_vendor_prefix_is_normalized() {
        let features = extract_features(r#"<div style="-webkit-border-radius:4px">x</div>"#);

        assert!(features.css_properties.contains("border-radius"));
        assert!(!features.css_properties.contains("-webkit-border-radius"));
        assert_eq!(features.css_values["border-radius"], set(&["4px"]));
    }

    #[test]
    fn test_media_feature_decomposition() {
        let features =
            extract_features("<style>@media (prefers-color-scheme: dark){}</style>");

        assert_eq!(
            features.css_at_rules,
            set(&["@media", "@media (prefers-color-scheme)"])
        );
    }

    #[test]
    fn test_media_query_with_several_features() {
        let features = extract_features(
            "<style>@media screen and (max-width:600px), (orientation: landscape) { .a { color: red } }</style>",
        );

        assert!(features.css_at_rules.contains("@media (max-width)"));
        assert!(features.css_at_rules.contains("@media (orientation)"));
        assert!(features.css_properties.contains("color"));
    }

    #[test]
    fn test_supports_at_rule() {
        let features =
            extract_features("<style>@supports (display: grid) { .a { display: grid } }</style>");

        assert!(features.css_at_rules.contains("@supports"));
        assert!(features.css_properties.contains("display"));
    }

    #[test]
    fn test_malformed_css_falls_back() {
        let features = extract_features("<style>.a{color:red;;; .b{</style>");
        assert!(features.css_properties.contains("color"));
    }

    #[test]
    fn test_unparseable_style_attribute_falls_back() {
        let features = extract_features(r#"<p style="color:red} width:10px">x</p>"#);

        assert!(features.css_properties.contains("color"));
        assert!(features.css_properties.contains("width"));
    }

    #[test]
    fn test_value_derived_features() {
        let features =
            extract_features(r#"<div style="background:linear-gradient(red,blue)">x</div>"#);

        assert!(features.css_properties.contains("background"));
        assert!(features.css_properties.contains("linear-gradient"));
    }

    #[test]
    fn test_custom_property_reference_as_last_token() {
        let features = extract_features(r#"<p style="color: var(--brand)">x</p>"#);

        assert_eq!(features.css_values["color"], set(&["var(--brand)"]));
        assert!(features.css_properties.contains("variables"));
    }

    #[test]
    fn test_deeply_nested_style_block_falls_back() {
        let html = format!("<style>{}color:red</style>", "a{".repeat(10_000));
        let features = extract_features(&html);

        assert!(features.css_properties.contains("color"));
        assert!(features.html_elements.contains("style"));
    }

    #[test]
    fn test_vendor_prefixed_value_feeds_unprefixed_property() {
        let features = extract_features(
            "<style>.a { -webkit-width: -webkit-fit-content; width: 100px }</style>",
        );

        assert_eq!(
            features.css_values["width"],
            set(&["-webkit-fit-content", "100px"])
        );
        assert!(features.css_properties.contains("fit-content"));
    }

    #[test]
    fn test_elements_and_attributes() {
        let html = r##"<!DOCTYPE html>
<HTML lang="en"><body>
<table role='presentation' cellpadding=0><tr><td bgcolor="#fff">
<o:p></o:p><img src="a.png" alt="">
</td></tr></table></body></HTML>"##;

        let features = extract_features(html);

        assert_eq!(
            features.html_elements,
            set(&["body", "html", "img", "o:p", "table", "td", "tr"])
        );
        assert_eq!(
            features.html_attributes,
            set(&["alt", "bgcolor", "cellpadding", "lang", "role", "src"])
        );
    }

    #[test]
    fn test_style_attribute_counts_as_attribute() {
        let features = extract_features(r#"<p style="color:red">x</p>"#);
        assert!(features.html_attributes.contains("style"));
        assert!(features.html_elements.contains("p"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"<style>@media (max-width:600px){.a{padding:0}}</style>
<div style="margin:0;-moz-box-shadow:0 0 1px red" class=x>y</div>"#;

        assert_eq!(extract_features(html), extract_features(html));
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(extract_features("").is_empty());

        let features = extract_features("<<<>>> style= \"}}{{\" <style>}{</style");
        assert!(features.css_properties.is_empty());
    }
}
