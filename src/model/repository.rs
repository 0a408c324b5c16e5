//! Repository nodes: the leaves of the dashboard tree

use std::fmt;
use serde::{Deserialize, Serialize};

use super::fetch_state::ContributionFetchState;
use super::record::ContributionRecord;
use super::store::ContributionStore;
use crate::filter::FilterPredicate;
use crate::stats::ContributionSummary;

/// Remote identifier of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryId(pub u64);

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "repo#{}", self.0)
    }
}

/// Repository identity and metadata as listed by the remote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub id: RepositoryId,
    pub name: String,
    pub full_name: String,
    pub url: String,
}

impl RepositoryInfo {
    /// Case-insensitive ordering key used for the group's repository list
    pub fn sort_key(&self) -> String {
        self.full_name.to_lowercase()
    }
}

/// One repository with its contributions and derived rollups
///
/// `summary` always covers every stored record; `matched_summary` covers the
/// records accepted by the current filter. Both are rebuilt from scratch on
/// every change rather than patched.
#[derive(Debug, Clone)]
pub struct RepositoryNode {
    info: RepositoryInfo,
    is_starred: bool,
    contributions: ContributionStore,
    fetch_state: ContributionFetchState,
    summary: ContributionSummary,
    matched_summary: ContributionSummary,
    generation: u64,
}

impl RepositoryNode {
    /// `generation` must come from the owning dashboard's [`Generations`]
    ///
    /// [`Generations`]: super::generation::Generations
    pub fn new(info: RepositoryInfo, is_starred: bool, generation: u64) -> Self {
        Self {
            info,
            is_starred,
            contributions: ContributionStore::new(),
            fetch_state: ContributionFetchState::NotQueried,
            summary: ContributionSummary::new(),
            matched_summary: ContributionSummary::new(),
            generation,
        }
    }

    pub fn id(&self) -> RepositoryId {
        self.info.id
    }

    pub fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn full_name(&self) -> &str {
        &self.info.full_name
    }

    pub fn url(&self) -> &str {
        &self.info.url
    }

    /// Link to the remote code-frequency graph
    pub fn contributions_url(&self) -> String {
        format!("{}/graphs/code-frequency", self.info.url)
    }

    pub fn is_starred(&self) -> bool {
        self.is_starred
    }

    pub fn contributions(&self) -> &ContributionStore {
        &self.contributions
    }

    pub fn fetch_state(&self) -> ContributionFetchState {
        self.fetch_state
    }

    pub fn summary(&self) -> &ContributionSummary {
        &self.summary
    }

    pub fn matched_summary(&self) -> &ContributionSummary {
        &self.matched_summary
    }

    /// Token identifying the current contribution epoch; replaced by resets
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_info(&mut self, info: RepositoryInfo) {
        debug_assert_eq!(info.id, self.info.id);
        self.info = info;
    }

    /// Returns true if the flag changed
    pub(crate) fn set_starred(&mut self, starred: bool) -> bool {
        let changed = self.is_starred != starred;
        self.is_starred = starred;
        changed
    }

    /// Enter `Querying` and hand out the token the completion must present
    pub(crate) fn begin_query(&mut self) -> u64 {
        self.fetch_state = ContributionFetchState::Querying;
        self.generation
    }

    /// Whether a completion carrying `generation` is still current
    pub(crate) fn accepts(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub(crate) fn complete_loaded(&mut self, records: Vec<ContributionRecord>, filter: &FilterPredicate) {
        self.contributions.replace_all(records);
        self.fetch_state = ContributionFetchState::Loaded;
        self.recompute_summaries(filter);
    }

    /// Pending leaves stored contributions untouched
    pub(crate) fn complete_pending(&mut self) {
        self.fetch_state = ContributionFetchState::Pending;
    }

    /// Failure leaves stored contributions untouched
    pub(crate) fn complete_failed(&mut self) {
        self.fetch_state = ContributionFetchState::Failed;
    }

    /// Drop all contributions and invalidate any in-flight query
    pub(crate) fn reset(&mut self, filter: &FilterPredicate, generation: u64) {
        self.generation = generation;
        self.contributions.clear();
        self.fetch_state = ContributionFetchState::NotQueried;
        self.recompute_summaries(filter);
    }

    /// Rebuild both summaries from the store
    pub(crate) fn recompute_summaries(&mut self, filter: &FilterPredicate) {
        self.summary = ContributionSummary::from_records(self.contributions.iter());
        self.matched_summary = ContributionSummary::from_records(
            self.contributions.iter().filter(|record| filter.matches_contribution(record)),
        );
    }
}
