//! JSON document printed for one checked email.

use mailcompat_core::Severity;
use mailcompat_dataset::ReferenceDataset;
use mailcompat_scanner::{embed_links, CompatibilityReport, EmbedLink};
use serde::Serialize;

/// Where the reference data came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo<'a> {
    pub api_version: Option<&'a str>,
    pub last_update_date: Option<&'a str>,
    pub features: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    pub dataset: DatasetInfo<'a>,
    #[serde(flatten)]
    pub report: &'a CompatibilityReport,
    pub links: Vec<EmbedLink>,
}

impl<'a> CheckOutput<'a> {
    pub fn new(
        dataset: &'a ReferenceDataset,
        report: &'a CompatibilityReport,
        embed_base_url: &str,
    ) -> Self {
        Self {
            dataset: DatasetInfo {
                api_version: dataset.api_version.as_deref(),
                last_update_date: dataset.last_update_date.as_deref(),
                features: dataset.len(),
            },
            report,
            links: embed_links(embed_base_url, &report.issues),
        }
    }
}

/// Whether the report's worst issue reaches `threshold`.
pub fn exceeds(report: &CompatibilityReport, threshold: Option<Severity>) -> bool {
    match (threshold, report.worst_severity()) {
        (Some(threshold), Some(worst)) => worst >= threshold,
        _ => false,
    }
}
