//! Shared types used across mailcompat.
//!
//! This module defines the classification enums and the fixed panel of
//! email clients every feature is evaluated against.

use crate::error::{MailcompatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of the client panel: a (family, platform) cell of the
/// support matrix plus a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClientDescriptor {
    /// Client family key in the reference stats (e.g. `outlook`)
    pub family: &'static str,
    /// Platform key under the family (e.g. `windows`)
    pub platform: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

impl fmt::Display for ClientDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// The curated panel of clients tracked for reporting.
///
/// Changing this list is a configuration change made at compile time.
pub const CLIENT_PANEL: &[ClientDescriptor] = &[
    ClientDescriptor {
        family: "apple-mail",
        platform: "macos",
        label: "Apple Mail macOS",
    },
    ClientDescriptor {
        family: "apple-mail",
        platform: "ios",
        label: "Apple Mail iOS",
    },
    ClientDescriptor {
        family: "gmail",
        platform: "desktop-webmail",
        label: "Gmail",
    },
    ClientDescriptor {
        family: "gmail",
        platform: "ios",
        label: "Gmail iOS",
    },
    ClientDescriptor {
        family: "gmail",
        platform: "android",
        label: "Gmail Android",
    },
    ClientDescriptor {
        family: "outlook",
        platform: "windows",
        label: "Outlook Windows",
    },
    ClientDescriptor {
        family: "outlook",
        platform: "macos",
        label: "Outlook macOS",
    },
    ClientDescriptor {
        family: "outlook",
        platform: "outlook-com",
        label: "Outlook.com",
    },
    ClientDescriptor {
        family: "yahoo",
        platform: "desktop-webmail",
        label: "Yahoo! Mail",
    },
    ClientDescriptor {
        family: "samsung-email",
        platform: "android",
        label: "Samsung Email",
    },
    ClientDescriptor {
        family: "thunderbird",
        platform: "macos",
        label: "Thunderbird",
    },
];

/// Get the compiled-in client panel.
#[must_use]
pub fn client_panel() -> &'static [ClientDescriptor] {
    CLIENT_PANEL
}

/// Overall classification of a feature across the client panel.
///
/// Ordered by increasing severity so `max()` picks the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Supported (or untracked) everywhere
    Success,
    /// At least one client has partial support
    Warning,
    /// At least one client has no support
    Error,
}

impl Severity {
    /// Get the lowercase name used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = MailcompatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Severity::Success),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(MailcompatError::Validation(format!(
                "unknown severity '{other}', expected error, warning or success"
            ))),
        }
    }
}

/// Which extracted identifier set an issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    /// CSS property (or synthetic value-derived feature)
    Css,
    /// CSS at-rule, including `@media (feature)` sub-keys
    CssAtRule,
    /// HTML element
    HtmlElement,
    /// HTML attribute
    HtmlAttribute,
}

impl FeatureType {
    /// Get the tag used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Css => "css",
            FeatureType::CssAtRule => "css-at-rule",
            FeatureType::HtmlElement => "html-element",
            FeatureType::HtmlAttribute => "html-attribute",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Support level recorded for one client in the reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    /// `y`
    Yes,
    /// `a`
    Partial,
    /// `n`
    No,
    /// `u`, or any code that does not parse
    Unknown,
}

impl SupportLevel {
    /// Map a single-letter support code to a level.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "y" => SupportLevel::Yes,
            "a" => SupportLevel::Partial,
            "n" => SupportLevel::No,
            _ => SupportLevel::Unknown,
        }
    }
}
