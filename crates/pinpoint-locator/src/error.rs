//! Error types for locator parsing and processing.

use thiserror::Error;

/// Errors raised while parsing or consuming a locator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// The locator text is malformed. `position` is the 1-based character
    /// position of the offending character.
    #[error("cannot parse locator: {message} (at position {position})")]
    Parse { position: usize, message: String },

    /// The locator parsed, but a value cannot be interpreted as requested
    /// (wrong type, or several values where one was expected).
    #[error("cannot process locator: {message}")]
    InvalidValue { message: String },

    /// The locator was fully parsed but some dimensions were never consumed.
    #[error("{message}")]
    UnusedDimensions {
        dimensions: Vec<String>,
        message: String,
    },
}

impl LocatorError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        LocatorError::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(message: impl Into<String>) -> Self {
        LocatorError::InvalidValue {
            message: message.into(),
        }
    }

    /// Appends extra detail to the error message, keeping the variant.
    pub fn with_detail(self, detail: &str) -> Self {
        match self {
            LocatorError::Parse { position, message } => LocatorError::Parse {
                position,
                message: format!("{message}\n{detail}"),
            },
            LocatorError::InvalidValue { message } => LocatorError::InvalidValue {
                message: format!("{message}\n{detail}"),
            },
            LocatorError::UnusedDimensions {
                dimensions,
                message,
            } => LocatorError::UnusedDimensions {
                dimensions,
                message: format!("{message}\n{detail}"),
            },
        }
    }
}

/// Result type for locator operations.
pub type Result<T> = std::result::Result<T, LocatorError>;
