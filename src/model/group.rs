//! Group nodes: organizations or users owning repositories

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use serde::{Deserialize, Serialize};

use super::fetch_state::ListingFetchState;
use super::generation::Generations;
use super::repository::{RepositoryId, RepositoryInfo, RepositoryNode};
use crate::filter::FilterPredicate;
use crate::stats::ContributionSummary;

/// Remote identifier of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Group identity as listed by the remote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: GroupId,
    /// Login of the organization or user
    pub name: String,
    pub avatar_url: Option<String>,
}

impl GroupInfo {
    /// Case-insensitive ordering key used for the dashboard's group list
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// One group with its repositories and derived rollups
#[derive(Debug, Clone)]
pub struct GroupNode {
    info: GroupInfo,
    starred_repo_names: BTreeSet<String>,
    repositories: Vec<RepositoryNode>,
    fetch_state: ListingFetchState,
    listed: bool,
    summary: ContributionSummary,
    matched_summary: ContributionSummary,
    generation: u64,
}

impl GroupNode {
    pub fn new(info: GroupInfo, generation: u64) -> Self {
        Self {
            info,
            starred_repo_names: BTreeSet::new(),
            repositories: Vec::new(),
            fetch_state: ListingFetchState::NotQueried,
            listed: false,
            summary: ContributionSummary::new(),
            matched_summary: ContributionSummary::new(),
            generation,
        }
    }

    pub fn id(&self) -> GroupId {
        self.info.id
    }

    pub fn info(&self) -> &GroupInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn starred_repo_names(&self) -> &BTreeSet<String> {
        &self.starred_repo_names
    }

    /// Repositories in case-insensitive full-name order
    pub fn repositories(&self) -> &[RepositoryNode] {
        &self.repositories
    }

    pub fn repository(&self, id: RepositoryId) -> Option<&RepositoryNode> {
        self.repositories.iter().find(|repo| repo.id() == id)
    }

    pub(crate) fn repository_mut(&mut self, id: RepositoryId) -> Option<&mut RepositoryNode> {
        self.repositories.iter_mut().find(|repo| repo.id() == id)
    }

    /// Repositories accepted by the filter, in display order
    pub fn visible_repositories<'a>(
        &'a self,
        filter: &'a FilterPredicate,
    ) -> impl Iterator<Item = &'a RepositoryNode> + 'a {
        self.repositories
            .iter()
            .filter(move |repo| filter.matches_repository(repo))
    }

    pub fn fetch_state(&self) -> ListingFetchState {
        self.fetch_state
    }

    /// Token a repository listing must present to land in this node
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn summary(&self) -> &ContributionSummary {
        &self.summary
    }

    pub fn matched_summary(&self) -> &ContributionSummary {
        &self.matched_summary
    }

    pub(crate) fn set_info(&mut self, info: GroupInfo) {
        debug_assert_eq!(info.id, self.info.id);
        self.info = info;
    }

    pub(crate) fn begin_listing(&mut self) {
        self.fetch_state = ListingFetchState::Querying;
    }

    /// A failed listing falls back to the last settled state
    pub(crate) fn fail_listing(&mut self) {
        self.fetch_state = if self.listed {
            ListingFetchState::Queried
        } else {
            ListingFetchState::NotQueried
        };
    }

    /// Replace the starred name set and re-derive every repository's flag
    ///
    /// Returns the number of repositories whose flag changed.
    pub(crate) fn set_starred_repo_names(&mut self, names: BTreeSet<String>) -> usize {
        self.starred_repo_names = names;
        let starred = &self.starred_repo_names;
        self.repositories
            .iter_mut()
            .filter_map(|repo| {
                let is_starred = starred.contains(repo.name());
                repo.set_starred(is_starred).then_some(())
            })
            .count()
    }

    /// Replace the repository collection with a fresh listing
    ///
    /// Repositories whose id is already present keep their contributions,
    /// fetch state, summaries and generation; only their metadata is
    /// refreshed. Missing ids are dropped and new ids start `NotQueried`
    /// with a fresh token from `generations`.
    pub(crate) fn replace_repositories(&mut self, listing: Vec<RepositoryInfo>, generations: &mut Generations) {
        let mut existing: HashMap<RepositoryId, RepositoryNode> = self
            .repositories
            .drain(..)
            .map(|repo| (repo.id(), repo))
            .collect();

        let mut repositories: Vec<RepositoryNode> = Vec::with_capacity(listing.len());
        for info in listing {
            let is_starred = self.starred_repo_names.contains(&info.name);
            // A listing may repeat an id across pages; the last copy's metadata wins
            let known = existing.remove(&info.id).or_else(|| {
                let position = repositories.iter().position(|repo| repo.id() == info.id)?;
                Some(repositories.remove(position))
            });
            let node = match known {
                Some(mut node) => {
                    node.set_info(info);
                    node.set_starred(is_starred);
                    node
                }
                None => RepositoryNode::new(info, is_starred, generations.next_token()),
            };
            repositories.push(node);
        }

        repositories.sort_by(|a, b| {
            a.info()
                .sort_key()
                .cmp(&b.info().sort_key())
                .then_with(|| a.full_name().cmp(b.full_name()))
        });
        self.repositories = repositories;
        self.fetch_state = ListingFetchState::Queried;
        self.listed = true;
        self.recompute_summaries();
    }

    /// Rebuild both group summaries from the repositories' summaries
    pub(crate) fn recompute_summaries(&mut self) {
        self.summary =
            ContributionSummary::from_summaries(self.repositories.iter().map(|repo| repo.summary()));
        self.matched_summary = ContributionSummary::from_summaries(
            self.repositories.iter().map(|repo| repo.matched_summary()),
        );
    }

    /// Re-run every repository's matched rollup, then this group's
    pub(crate) fn apply_filter(&mut self, filter: &FilterPredicate) {
        for repo in self.repositories.iter_mut() {
            repo.recompute_summaries(filter);
        }
        self.recompute_summaries();
    }
}
