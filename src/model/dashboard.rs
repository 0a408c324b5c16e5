//! Dashboard root: the group collection and the grand total
//!
//! The dashboard owns every node of the tree. Mutations always touch the
//! children first and then recompute upward (repository, group, total) so a
//! reader never sees a summary that disagrees with its children.

use std::collections::HashMap;

use super::fetch_state::ListingFetchState;
use super::generation::Generations;
use super::group::{GroupId, GroupInfo, GroupNode};
use super::repository::{RepositoryId, RepositoryInfo, RepositoryNode};
use crate::filter::FilterPredicate;
use crate::stats::ContributionSummary;

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    groups: Vec<GroupNode>,
    summary: ContributionSummary,
    fetch_state: ListingFetchState,
    listed: bool,
    identity: Option<GroupInfo>,
    filter: FilterPredicate,
    session_epoch: u64,
    generations: Generations,
}

impl Dashboard {
    pub fn new(filter: FilterPredicate) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Groups in case-insensitive name order
    pub fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupNode> {
        self.groups.iter().find(|group| group.id() == id)
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> Option<&mut GroupNode> {
        self.groups.iter_mut().find(|group| group.id() == id)
    }

    pub(crate) fn groups_mut(&mut self) -> impl Iterator<Item = &mut GroupNode> + '_ {
        self.groups.iter_mut()
    }

    /// Locate a repository anywhere in the tree, with its owning group
    pub fn find_repository(&self, id: RepositoryId) -> Option<(&GroupNode, &RepositoryNode)> {
        self.groups
            .iter()
            .find_map(|group| group.repository(id).map(|repo| (group, repo)))
    }

    pub(crate) fn owner_of(&self, id: RepositoryId) -> Option<GroupId> {
        self.find_repository(id).map(|(group, _)| group.id())
    }

    pub(crate) fn repository_mut(&mut self, id: RepositoryId) -> Option<&mut RepositoryNode> {
        self.groups
            .iter_mut()
            .find_map(|group| group.repository_mut(id))
    }

    /// Groups accepted by the current filter
    pub fn visible_groups(&self) -> impl Iterator<Item = &GroupNode> + '_ {
        let filter = self.filter;
        self.groups
            .iter()
            .filter(move |group| filter.matches_group(group))
    }

    pub fn summary(&self) -> &ContributionSummary {
        &self.summary
    }

    pub fn fetch_state(&self) -> ListingFetchState {
        self.fetch_state
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

    /// The authenticated identity, once logged in
    pub fn identity(&self) -> Option<&GroupInfo> {
        self.identity.as_ref()
    }

    pub(crate) fn set_identity(&mut self, identity: GroupInfo) {
        self.identity = Some(identity);
    }

    pub fn filter(&self) -> &FilterPredicate {
        &self.filter
    }

    /// Token bumped on logout; completions from an older session are stale
    pub fn session_epoch(&self) -> u64 {
        self.session_epoch
    }

    /// Fresh generation token, never handed out before by this dashboard
    pub(crate) fn next_token(&mut self) -> u64 {
        self.generations.next_token()
    }

    /// Total number of repositories across every group
    pub fn repository_count(&self) -> usize {
        self.groups.iter().map(|group| group.repositories().len()).sum()
    }

    /// Replace the group collection, keeping nodes whose id survives
    pub(crate) fn replace_groups(&mut self, listing: Vec<GroupInfo>) {
        let mut existing: HashMap<GroupId, GroupNode> = self
            .groups
            .drain(..)
            .map(|group| (group.id(), group))
            .collect();

        let mut groups: Vec<GroupNode> = Vec::with_capacity(listing.len());
        for info in listing {
            let known = existing.remove(&info.id).or_else(|| {
                let position = groups.iter().position(|group| group.id() == info.id)?;
                Some(groups.remove(position))
            });
            let node = match known {
                Some(mut node) => {
                    node.set_info(info);
                    node
                }
                None => GroupNode::new(info, self.generations.next_token()),
            };
            groups.push(node);
        }

        groups.sort_by(|a, b| {
            a.info()
                .sort_key()
                .cmp(&b.info().sort_key())
                .then_with(|| a.name().cmp(b.name()))
        });
        self.groups = groups;
        self.fetch_state = ListingFetchState::Queried;
        self.listed = true;
        self.recompute_total();
    }

    /// Replace one group's repositories and recompute upward
    ///
    /// Returns the new repository count, or `None` for an unknown group.
    pub(crate) fn replace_repositories(&mut self, id: GroupId, listing: Vec<RepositoryInfo>) -> Option<usize> {
        let generations = &mut self.generations;
        let group = self.groups.iter_mut().find(|group| group.id() == id)?;
        group.replace_repositories(listing, generations);
        let count = group.repositories().len();
        self.recompute_total();
        Some(count)
    }

    /// Drop the whole tree and invalidate the session
    pub(crate) fn clear(&mut self) {
        self.groups.clear();
        self.identity = None;
        self.fetch_state = ListingFetchState::NotQueried;
        self.listed = false;
        self.session_epoch += 1;
        self.recompute_total();
    }

    /// Recompute a group's summaries and then the grand total
    pub(crate) fn propagate_from_group(&mut self, id: GroupId) {
        if let Some(group) = self.group_mut(id) {
            group.recompute_summaries();
        }
        self.recompute_total();
    }

    /// Only the unfiltered grand total is tracked at dashboard level
    pub(crate) fn recompute_total(&mut self) {
        self.summary = ContributionSummary::from_summaries(self.groups.iter().map(|group| group.summary()));
    }

    /// Change the filter flag and re-run every matched rollup
    ///
    /// Returns false (and does nothing) when the flag is unchanged.
    pub(crate) fn set_filter(&mut self, starred_only: bool) -> bool {
        if !self.filter.set_starred_only(starred_only) {
            return false;
        }
        let filter = self.filter;
        for group in self.groups.iter_mut() {
            group.apply_filter(&filter);
        }
        self.recompute_total();
        true
    }
}
