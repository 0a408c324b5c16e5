//! Dashboard filter
//!
//! The filter decides which groups and repositories are shown and which
//! contributions feed the "matched" summaries. All evaluators are pure given
//! the current flag.

use serde::{Deserialize, Serialize};

use crate::model::{ContributionRecord, GroupNode, RepositoryNode};

/// Stateful predicate over groups, repositories and contributions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    starred_only: bool,
}

impl FilterPredicate {
    pub fn new(starred_only: bool) -> Self {
        Self { starred_only }
    }

    pub fn starred_only(&self) -> bool {
        self.starred_only
    }

    /// Update the flag, returning true if it changed
    pub fn set_starred_only(&mut self, starred_only: bool) -> bool {
        let changed = self.starred_only != starred_only;
        self.starred_only = starred_only;
        changed
    }

    /// A group matches when the filter is off or it has any starred repository
    pub fn matches_group(&self, group: &GroupNode) -> bool {
        !self.starred_only || !group.starred_repo_names().is_empty()
    }

    /// A repository matches when the filter is off or it is starred
    pub fn matches_repository(&self, repository: &RepositoryNode) -> bool {
        !self.starred_only || repository.is_starred()
    }

    /// No contribution-level criterion exists yet; every record matches
    pub fn matches_contribution(&self, _record: &ContributionRecord) -> bool {
        true
    }
}
