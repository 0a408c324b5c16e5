//! Remote Data Source
//!
//! The narrow contract through which the engine reaches a source-hosting
//! service. Transport details live entirely behind [`RemoteSource`]; the
//! engine only sees pages of listings and statistics responses.

pub mod error;
pub mod pagination;
pub mod synthetic;

use std::fmt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{GroupInfo, RepositoryInfo, WeeklyContribution};

pub use error::{FetchError, FetchResult};
pub use pagination::collect_all_pages;
pub use synthetic::{SyntheticConfig, SyntheticSource};

/// Opaque continuation token identifying the next page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a listing plus the cursor for the page after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn with_next(items: Vec<T>, next: Cursor) -> Self {
        Self {
            items,
            next: Some(next),
        }
    }
}

/// Group row as listed by the source
pub type GroupListing = GroupInfo;

/// Repository row as listed by the source
pub type RepositoryListing = RepositoryInfo;

/// Result of a contributor-statistics request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticsResponse {
    /// Weekly rows; may include zero-commit weeks
    Ready(Vec<WeeklyContribution>),
    /// The source is still computing statistics for this repository
    Pending,
}

/// Asynchronous remote data source
///
/// Listing methods return one page at a time; callers follow the cursor
/// with [`collect_all_pages`]. A `None` cursor requests the first page.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// The identity the source is authenticated as
    async fn authenticated_user(&self) -> FetchResult<GroupListing>;

    /// Organizations visible to the authenticated identity
    async fn list_groups_page(&self, cursor: Option<Cursor>) -> FetchResult<Page<GroupListing>>;

    /// Starred repositories, each qualified as `owner/name`
    async fn list_starred_page(&self, cursor: Option<Cursor>) -> FetchResult<Page<String>>;

    /// Repositories owned by `owner`
    async fn list_repositories_page(
        &self,
        owner: &str,
        cursor: Option<Cursor>,
    ) -> FetchResult<Page<RepositoryListing>>;

    /// Weekly contributor statistics for a repository
    async fn contributor_statistics(&self, full_name: &str) -> FetchResult<StatisticsResponse>;
}
