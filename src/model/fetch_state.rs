//! Per-node fetch lifecycle states

use std::fmt;
use serde::{Deserialize, Serialize};

/// State of a repository's contributor-statistics fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContributionFetchState {
    /// Never queried, or reset
    #[default]
    NotQueried,
    /// A statistics request is in flight
    Querying,
    /// The remote source is still computing statistics
    Pending,
    /// Statistics were loaded (possibly zero records)
    Loaded,
    /// The last request failed
    Failed,
}

impl ContributionFetchState {
    /// Whether a new query may be issued from this state
    pub fn is_queryable(&self) -> bool {
        !matches!(self, ContributionFetchState::Querying)
    }

    /// Whether an explicit reset applies from this state
    ///
    /// Resetting a `Querying` node orphans the in-flight request; its
    /// completion is discarded when it arrives.
    pub fn is_resettable(&self) -> bool {
        !matches!(self, ContributionFetchState::NotQueried)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionFetchState::NotQueried => "not-queried",
            ContributionFetchState::Querying => "querying",
            ContributionFetchState::Pending => "pending",
            ContributionFetchState::Loaded => "loaded",
            ContributionFetchState::Failed => "failed",
        }
    }
}

impl fmt::Display for ContributionFetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a group-list or repository-list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ListingFetchState {
    #[default]
    NotQueried,
    Querying,
    Queried,
}

impl ListingFetchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingFetchState::NotQueried => "not-queried",
            ListingFetchState::Querying => "querying",
            ListingFetchState::Queried => "queried",
        }
    }
}

impl fmt::Display for ListingFetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state completion of a statistics query, as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    Loaded,
    Pending,
    Failed,
    /// The completion arrived after a reset or logout and was ignored
    Discarded,
}

impl FetchOutcome {
    /// The node state a fresh (non-discarded) outcome leads to
    pub fn resulting_state(&self) -> Option<ContributionFetchState> {
        match self {
            FetchOutcome::Loaded => Some(ContributionFetchState::Loaded),
            FetchOutcome::Pending => Some(ContributionFetchState::Pending),
            FetchOutcome::Failed => Some(ContributionFetchState::Failed),
            FetchOutcome::Discarded => None,
        }
    }
}
