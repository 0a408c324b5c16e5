//! Remote Fetch Error Types
//!
//! Failures reported by a remote data source. "Statistics not computed yet"
//! is not an error and never appears here.

use thiserror::Error;

use crate::model::InvalidWeek;

/// Result type for remote fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while talking to the remote source
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or remote-side failure; safe to retry
    #[error("{operation} failed: {message}")]
    Transient { operation: String, message: String },

    /// The payload was missing expected fields or held invalid values
    #[error("{operation} returned a malformed response: {message}")]
    Malformed { operation: String, message: String },
}

impl FetchError {
    /// Create a transient failure
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-response failure
    pub fn malformed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// The operation that failed
    pub fn operation(&self) -> &str {
        match self {
            Self::Transient { operation, .. } | Self::Malformed { operation, .. } => operation,
        }
    }

    /// Both kinds leave the node queryable again
    pub fn is_retryable(&self) -> bool {
        true
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Wrap an unrepresentable week row for the given statistics request
    pub fn invalid_week(full_name: &str, error: InvalidWeek) -> Self {
        Self::malformed(format!("statistics for {full_name}"), error.to_string())
    }
}
