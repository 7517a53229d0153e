//! Error types for query execution.

use pinpoint_locator::LocatorError;
use thiserror::Error;

/// Errors surfaced by [`crate::Finder`] operations.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The locator could not be parsed or left dimensions unconsumed.
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// No item matches a query that requires one.
    #[error("{message}")]
    NotFound { message: String },

    /// An operation that assumes at most one match observed several. This is
    /// an invariant violation in the data binding, not a user input error.
    #[error("{message}")]
    Ambiguous { message: String },
}

impl FinderError {
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        FinderError::NotFound {
            message: message.into(),
        }
    }

    pub(crate) fn ambiguous(message: impl Into<String>) -> Self {
        FinderError::Ambiguous {
            message: message.into(),
        }
    }

    /// Whether this is a not-found signal (used to relax single-item misses
    /// into empty multi-item results).
    pub fn is_not_found(&self) -> bool {
        matches!(self, FinderError::NotFound { .. })
    }
}

/// Result type for finder operations.
pub type Result<T> = std::result::Result<T, FinderError>;
