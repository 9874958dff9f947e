//! Error types for the scanner.

use thiserror::Error;

/// Structural CSS parse failure.
///
/// Never escapes the extractor: a failing block is re-read with the
/// lenient pattern scan instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CssParseError {
    /// The tokens could not be structured into rules and declarations
    #[error("CSS syntax error at {line}:{column}: {reason}")]
    Syntax {
        /// 1-based line of the offending token
        line: u32,
        /// Column of the offending token
        column: u32,
        /// What was wrong
        reason: String,
    },
}

/// Result type for structural CSS parsing.
pub type Result<T> = std::result::Result<T, CssParseError>;
