//! Identifier lookup index over the reference dataset.
//!
//! Documents name features three ways: by slug, by human title and by free
//! keyword aliases. The index flattens all of them into one mapping per
//! extractable category. The first feature (in dataset order) to claim an
//! identifier keeps it; later claims are dropped.

use crate::definition::{FeatureCategory, ReferenceDataset, ReferenceFeature};
use mailcompat_core::FeatureType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

static BRACKETED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<([a-z][a-z0-9-]*)>").expect("valid bracketed tag regex"));

static ELEMENT_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([a-z][a-z0-9-]*)\s+element\s*$").expect("valid element title regex")
});

static ATTRIBUTE_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([a-z][a-z0-9-]*)\s+attribute\s*$").expect("valid attribute title regex")
});

type FeatureMap = HashMap<String, Arc<ReferenceFeature>>;

/// Read-only lookup from document identifiers to reference features.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    css: FeatureMap,
    html_elements: FeatureMap,
    html_attributes: FeatureMap,
}

impl ReferenceIndex {
    /// Build the index for a dataset.
    #[must_use]
    pub fn from_dataset(dataset: &ReferenceDataset) -> Self {
        Self::build(&dataset.features)
    }

    /// Build the three mappings from features in dataset order.
    #[must_use]
    pub fn build(features: &[Arc<ReferenceFeature>]) -> Self {
        let mut index = Self::default();

        for feature in features {
            if feature.category != FeatureCategory::Html {
                if feature.category == FeatureCategory::Css {
                    index.register_css(feature);
                }
                continue;
            }
            index.register_html_element(feature);
            index.register_html_attribute(feature);
        }

        info!(
            css = index.css.len(),
            html_elements = index.html_elements.len(),
            html_attributes = index.html_attributes.len(),
            "built reference index"
        );

        index
    }

    fn register_css(&mut self, feature: &Arc<ReferenceFeature>) {
        let primary = feature
            .slug
            .strip_prefix("css-")
            .unwrap_or(&feature.slug)
            .to_lowercase();
        let title = feature.title.trim().to_lowercase();

        let title_differs = title != primary;
        register(&mut self.css, primary, feature, "css");
        if title_differs {
            register(&mut self.css, title, feature, "css");
        }
        for keyword in feature.keyword_list() {
            register(&mut self.css, keyword, feature, "css");
        }
    }

    fn register_html_element(&mut self, feature: &Arc<ReferenceFeature>) {
        let stripped = feature
            .slug
            .strip_prefix("html-")
            .unwrap_or(&feature.slug)
            .to_lowercase();
        if stripped.contains("attribute") {
            return;
        }

        register(&mut self.html_elements, stripped, feature, "html-element");

        if let Some(caps) = BRACKETED_TAG
            .captures(&feature.title)
            .or_else(|| ELEMENT_TITLE.captures(&feature.title))
        {
            register(
                &mut self.html_elements,
                caps[1].to_lowercase(),
                feature,
                "html-element",
            );
        }

        for keyword in single_word_keywords(feature) {
            register(&mut self.html_elements, keyword, feature, "html-element");
        }
    }

    fn register_html_attribute(&mut self, feature: &Arc<ReferenceFeature>) {
        if let Some(caps) = ATTRIBUTE_TITLE.captures(&feature.title) {
            register(
                &mut self.html_attributes,
                caps[1].to_lowercase(),
                feature,
                "html-attribute",
            );
        }

        if feature.slug.contains("attribute") {
            let stripped = feature.slug.strip_prefix("html-").unwrap_or(&feature.slug);
            let stripped = stripped.strip_suffix("-attribute").unwrap_or(stripped);
            register(
                &mut self.html_attributes,
                stripped.to_lowercase(),
                feature,
                "html-attribute",
            );
        }

        for keyword in single_word_keywords(feature) {
            register(&mut self.html_attributes, keyword, feature, "html-attribute");
        }
    }

    /// Look up a CSS property, synthetic value feature or at-rule.
    #[must_use]
    pub fn css_feature(&self, identifier: &str) -> Option<&Arc<ReferenceFeature>> {
        self.css.get(identifier)
    }

    /// Look up an HTML element by tag name.
    #[must_use]
    pub fn html_element(&self, identifier: &str) -> Option<&Arc<ReferenceFeature>> {
        self.html_elements.get(identifier)
    }

    /// Look up an HTML attribute by name.
    #[must_use]
    pub fn html_attribute(&self, identifier: &str) -> Option<&Arc<ReferenceFeature>> {
        self.html_attributes.get(identifier)
    }

    /// Look up an identifier in the mapping for its feature type.
    /// At-rules share the CSS mapping.
    #[must_use]
    pub fn lookup(
        &self,
        feature_type: FeatureType,
        identifier: &str,
    ) -> Option<&Arc<ReferenceFeature>> {
        match feature_type {
            FeatureType::Css | FeatureType::CssAtRule => self.css_feature(identifier),
            FeatureType::HtmlElement => self.html_element(identifier),
            FeatureType::HtmlAttribute => self.html_attribute(identifier),
        }
    }

    /// Number of registered identifiers for a feature type.
    #[must_use]
    pub fn len(&self, feature_type: FeatureType) -> usize {
        match feature_type {
            FeatureType::Css | FeatureType::CssAtRule => self.css.len(),
            FeatureType::HtmlElement => self.html_elements.len(),
            FeatureType::HtmlAttribute => self.html_attributes.len(),
        }
    }

    /// Whether all three mappings are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.html_elements.is_empty() && self.html_attributes.is_empty()
    }
}

fn single_word_keywords(feature: &ReferenceFeature) -> impl Iterator<Item = String> + '_ {
    feature
        .keyword_list()
        .filter(|keyword| !keyword.contains(char::is_whitespace))
}

fn register(
    map: &mut FeatureMap,
    key: String,
    feature: &Arc<ReferenceFeature>,
    mapping: &'static str,
) {
    if key.is_empty() {
        return;
    }

    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(Arc::clone(feature));
        }
        Entry::Occupied(slot) => {
            if slot.get().slug != feature.slug {
                debug!(
                    mapping,
                    key = %slot.key(),
                    kept = %slot.get().slug,
                    dropped = %feature.slug,
                    "identifier already claimed, keeping first registration"
                );
            }
        }
    }
}
