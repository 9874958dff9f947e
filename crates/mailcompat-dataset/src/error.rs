//! Error types for the dataset subsystem.

use thiserror::Error;

/// Errors that can occur while acquiring or accessing the reference dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Dataset file not found
    #[error("reference dataset not found at {path}")]
    NotFound {
        /// Expected file path
        path: String,
    },

    /// Dataset JSON could not be parsed
    #[error("failed to parse reference dataset JSON from {source_name}: {source}")]
    ParseError {
        /// Path or label of the input
        source_name: String,
        /// JSON parse error
        #[source]
        source: serde_json::Error,
    },

    /// No dataset has been installed in the registry yet
    #[error("no reference dataset loaded")]
    NotLoaded,

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(#[from] mailcompat_core::ConfigError),

    /// I/O error while reading the dataset
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
