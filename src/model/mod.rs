//! Contribution tree data model
//!
//! Dashboard -> GroupNode -> RepositoryNode -> ContributionStore, with the
//! per-node fetch states and derived summaries.

pub mod dashboard;
pub mod fetch_state;
pub mod generation;
pub mod group;
pub mod record;
pub mod repository;
pub mod store;

pub use dashboard::Dashboard;
pub use fetch_state::{ContributionFetchState, FetchOutcome, ListingFetchState};
pub use generation::Generations;
pub use group::{GroupId, GroupInfo, GroupNode};
pub use record::{from_weeks, ContributionRecord, InvalidWeek, WeeklyContribution};
pub use repository::{RepositoryId, RepositoryInfo, RepositoryNode};
pub use store::{display_order, ContributionStore};
