//! Notification System Error Types

use std::fmt;

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in the notification system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Subscriber already exists
    SubscriberAlreadyExists(String),

    /// Subscriber not found
    SubscriberNotFound(String),

    /// Subscriber limit reached
    SubscriberLimitReached(usize),

    /// Event delivery failed
    DeliveryFailed {
        subscriber_id: String,
        error: String,
    },

    /// System shutdown in progress
    SystemShutdown,

    /// Timeout occurred
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// Generic error
    Generic(String),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::SubscriberAlreadyExists(id) => {
                write!(f, "Subscriber '{}' already exists", id)
            }
            NotificationError::SubscriberNotFound(id) => {
                write!(f, "Subscriber '{}' not found", id)
            }
            NotificationError::SubscriberLimitReached(max) => {
                write!(f, "Maximum number of subscribers ({}) reached", max)
            }
            NotificationError::DeliveryFailed { subscriber_id, error } => {
                write!(f, "Failed to deliver event to '{}': {}", subscriber_id, error)
            }
            NotificationError::SystemShutdown => {
                write!(f, "Notification system is shutting down")
            }
            NotificationError::Timeout { operation, duration_ms } => {
                write!(f, "Operation '{}' timed out after {}ms", operation, duration_ms)
            }
            NotificationError::Generic(msg) => {
                write!(f, "Notification error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl NotificationError {
    pub fn subscriber_already_exists<S: Into<String>>(id: S) -> Self {
        Self::SubscriberAlreadyExists(id.into())
    }

    pub fn subscriber_not_found<S: Into<String>>(id: S) -> Self {
        Self::SubscriberNotFound(id.into())
    }

    pub fn delivery_failed<S: Into<String>, E: Into<String>>(subscriber_id: S, error: E) -> Self {
        Self::DeliveryFailed {
            subscriber_id: subscriber_id.into(),
            error: error.into(),
        }
    }

    pub fn timeout<S: Into<String>>(operation: S, duration_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }
}
