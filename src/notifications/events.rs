//! Notification Event Types
//!
//! Typed change events emitted by the dashboard engine. Events are published
//! only after the tree mutation and every upward recompute have finished.

use serde::{Deserialize, Serialize};

use crate::model::{ContributionFetchState, GroupId, ListingFetchState, RepositoryId};

/// Base trait for all notification events
pub trait NotificationEvent: Send + Sync + Clone + std::fmt::Debug + 'static {}

/// Level of the tree whose summary was recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryScope {
    Repository(RepositoryId),
    Group(GroupId),
    Dashboard,
}

/// The listing a fetch-state change refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingTarget {
    Groups,
    Repositories(GroupId),
}

/// Structural and derived-state changes of the contribution tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardEvent {
    /// The group collection was replaced or cleared
    GroupsChanged {
        group_count: usize,
    },

    /// A group's repository collection was replaced
    RepositoriesChanged {
        group_id: GroupId,
        repository_count: usize,
    },

    /// A repository's contributions were replaced or cleared
    ContributionsChanged {
        repository_id: RepositoryId,
        record_count: usize,
    },

    SummaryRecomputed {
        scope: SummaryScope,
    },

    ContributionFetchChanged {
        repository_id: RepositoryId,
        state: ContributionFetchState,
    },

    ListingFetchChanged {
        target: ListingTarget,
        state: ListingFetchState,
    },

    FilterChanged {
        starred_only: bool,
    },

    LoggedIn {
        login: String,
    },

    LoggedOut,
}

impl NotificationEvent for DashboardEvent {}

impl DashboardEvent {
    /// Short type name used in logs
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::GroupsChanged { .. } => "groups_changed",
            DashboardEvent::RepositoriesChanged { .. } => "repositories_changed",
            DashboardEvent::ContributionsChanged { .. } => "contributions_changed",
            DashboardEvent::SummaryRecomputed { .. } => "summary_recomputed",
            DashboardEvent::ContributionFetchChanged { .. } => "contribution_fetch_changed",
            DashboardEvent::ListingFetchChanged { .. } => "listing_fetch_changed",
            DashboardEvent::FilterChanged { .. } => "filter_changed",
            DashboardEvent::LoggedIn { .. } => "logged_in",
            DashboardEvent::LoggedOut => "logged_out",
        }
    }

    pub fn summary(scope: SummaryScope) -> Self {
        Self::SummaryRecomputed { scope }
    }

    pub fn contribution_fetch(repository_id: RepositoryId, state: ContributionFetchState) -> Self {
        Self::ContributionFetchChanged { repository_id, state }
    }

    pub fn listing_fetch(target: ListingTarget, state: ListingFetchState) -> Self {
        Self::ListingFetchChanged { target, state }
    }

    /// The repository this event concerns, if any
    pub fn repository_id(&self) -> Option<RepositoryId> {
        match self {
            DashboardEvent::ContributionsChanged { repository_id, .. }
            | DashboardEvent::ContributionFetchChanged { repository_id, .. } => Some(*repository_id),
            DashboardEvent::SummaryRecomputed {
                scope: SummaryScope::Repository(id),
            } => Some(*id),
            _ => None,
        }
    }
}
