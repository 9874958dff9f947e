//! Features detected from CSS values rather than property names.
//!
//! A gradient or `calc()` is a compatibility concern independent of which
//! property it appears in, so matches are reported as synthetic identifiers
//! and looked up in the CSS mapping like any property.

use once_cell::sync::Lazy;
use regex::Regex;

/// Feature name and the pattern that detects it in a lowercased value.
pub const VALUE_FEATURES: &[(&str, &str)] = &[
    ("linear-gradient", r"(?:^|[^\w-]|-(?:webkit|moz|ms|o)-)linear-gradient\s*\("),
    ("radial-gradient", r"(?:^|[^\w-]|-(?:webkit|moz|ms|o)-)radial-gradient\s*\("),
    ("conic-gradient", r"(?:^|[^\w-]|-(?:webkit|moz|ms|o)-)conic-gradient\s*\("),
    ("repeating-linear-gradient", r"repeating-linear-gradient\s*\("),
    ("repeating-radial-gradient", r"repeating-radial-gradient\s*\("),
    ("repeating-conic-gradient", r"repeating-conic-gradient\s*\("),
    ("calc()", r"\bcalc\s*\("),
    ("variables", r"\bvar\s*\(\s*--"),
    ("clamp()", r"\bclamp\s*\("),
    ("min()", r"(?:^|[^\w-])min\s*\("),
    ("max()", r"(?:^|[^\w-])max\s*\("),
    ("fit-content", r"\bfit-content\b"),
    ("min-content", r"\bmin-content\b"),
    ("max-content", r"\bmax-content\b"),
];

static COMPILED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    VALUE_FEATURES
        .iter()
        .map(|(name, pattern)| {
            (
                *name,
                Regex::new(pattern).expect("value feature patterns are hardcoded and valid"),
            )
        })
        .collect()
});

/// Names of every value feature present in `value`.
pub fn value_features_in(value: &str) -> impl Iterator<Item = &'static str> + '_ {
    COMPILED
        .iter()
        .filter(move |(_, pattern)| pattern.is_match(value))
        .map(|(name, _)| *name)
}
