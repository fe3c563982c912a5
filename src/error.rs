//! Error handling for the activity-progress library.
//!
//! The analytics core is total over its input domain: malformed fields fall
//! back to defaults and never surface here. Errors are reserved for the
//! boundaries where a caller hands over something that cannot be interpreted
//! at all (a broken JSON document, an invalid configuration, an unknown
//! selector string).

use thiserror::Error;

/// Error type for activity-progress operations.
#[derive(Debug, Clone, Error)]
pub enum ProgressError {
    /// Input document could not be parsed as a list of activities
    #[error("Invalid activity input: {message}")]
    InvalidInput { message: String },
    /// Configuration failed validation
    #[error("Configuration error: {message}")]
    Config { message: String },
    /// Filter selector text did not match any known value
    #[error("Unknown {kind} selector '{value}'")]
    UnknownSelector { kind: &'static str, value: String },
}

impl ProgressError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ProgressError::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ProgressError {
    fn from(err: serde_json::Error) -> Self {
        ProgressError::InvalidInput {
            message: err.to_string(),
        }
    }
}

/// Result type alias for activity-progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;
