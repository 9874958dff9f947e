//! Mailcompat Core - Foundation crate for the mailcompat email compatibility checker.
//!
//! This crate provides shared types, error handling and configuration management
//! that the dataset and scanner crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared enums and the fixed email client panel
//!
//! # Example
//!
//! ```rust
//! use mailcompat_core::{client_panel, AppConfig, Severity};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.dataset.validity_hours, 24);
//!
//! let outlook = client_panel()
//!     .iter()
//!     .find(|client| client.family == "outlook" && client.platform == "windows");
//! assert!(outlook.is_some());
//! assert!(Severity::Error > Severity::Warning);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, DatasetConfig, ReportConfig};
pub use error::{ConfigError, ConfigResult, MailcompatError, Result};
pub use types::{client_panel, ClientDescriptor, FeatureType, Severity, SupportLevel, CLIENT_PANEL};
