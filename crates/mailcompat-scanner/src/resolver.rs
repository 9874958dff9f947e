//! Latest recorded support of one feature in one client.

use mailcompat_core::SupportLevel;
use mailcompat_dataset::ReferenceFeature;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

static SUPPORT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ynau])\s*(?:#(\d+))?$").expect("valid support code regex"));

/// Outcome of resolving a (family, platform) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SupportResolution {
    /// The feature has no history for this family or platform
    NoData,
    /// Latest recorded observation
    Recorded {
        /// Parsed level; codes that don't parse are `Unknown`
        level: SupportLevel,
        /// Version key of the latest observation
        version: String,
        /// Footnote text, when the code references a known note
        note: Option<String>,
    },
}

impl SupportResolution {
    /// Level for bucketing; missing data counts as unknown.
    #[must_use]
    pub fn level(&self) -> SupportLevel {
        match self {
            SupportResolution::NoData => SupportLevel::Unknown,
            SupportResolution::Recorded { level, .. } => *level,
        }
    }
}

/// Resolve the most recent support level of `feature` for one client cell.
///
/// The last version listed for the platform is taken as the latest.
#[must_use]
pub fn resolve_support(
    feature: &ReferenceFeature,
    family: &str,
    platform: &str,
) -> SupportResolution {
    let Some((version, raw)) = feature
        .history(family, platform)
        .and_then(|history| history.latest())
    else {
        return SupportResolution::NoData;
    };

    let (level, note) = match SUPPORT_CODE.captures(raw) {
        Some(caps) => {
            let note = caps
                .get(2)
                .and_then(|number| feature.note(number.as_str()))
                .map(str::to_string);
            (SupportLevel::from_code(&caps[1]), note)
        }
        None => {
            trace!(
                slug = %feature.slug,
                family,
                platform,
                raw,
                "unrecognised support code"
            );
            (SupportLevel::Unknown, None)
        }
    };

    SupportResolution::Recorded {
        level,
        version: version.to_string(),
        note,
    }
}
