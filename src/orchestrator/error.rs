//! Engine Error Types
//!
//! Misuse of the orchestrator's entry points. Remote failures for a node are
//! reported through fetch outcomes, not through these errors.

use thiserror::Error;

use crate::model::{GroupId, RepositoryId};
use crate::remote::FetchError;

/// Result type for orchestrator operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the fetch orchestrator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No group with this id is in the tree
    #[error("Unknown group {0}")]
    UnknownGroup(GroupId),

    /// No repository with this id is in the tree
    #[error("Unknown repository {0}")]
    UnknownRepository(RepositoryId),

    /// The authenticated identity could not be fetched
    #[error("Login failed: {0}")]
    Login(#[source] FetchError),
}
