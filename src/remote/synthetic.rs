//! Synthetic Remote Source
//!
//! Deterministic in-memory data source. Groups are named `G1..Gn`, every
//! group owns repositories `R1..Rm`, and every third repository is starred.
//! The authenticated user owns the same repository layout. Statistics are
//! generated from a seed, so the same configuration always yields the same
//! tree.
//!
//! Listings are paginated by `page_size`. Every `pending_every`-th statistics
//! request answers "pending" and every `fail_every`-th page request fails,
//! which exercises the partial-availability paths of the engine.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{Cursor, FetchError, FetchResult, GroupListing, Page, RemoteSource, RepositoryListing, StatisticsResponse};
use crate::model::{GroupId, RepositoryId, WeeklyContribution};

const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;
/// Sunday 2024-01-07 00:00:00 UTC
const FIRST_WEEK: i64 = 1_704_585_600;

/// Shape of the generated data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub user: String,
    pub groups: usize,
    pub repositories: usize,
    pub weeks: usize,
    pub contributors: usize,
    pub page_size: usize,
    /// Every n-th statistics request answers pending; 0 disables
    pub pending_every: usize,
    /// Every n-th page request fails; 0 disables
    pub fail_every: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            user: "me".to_string(),
            groups: 3,
            repositories: 5,
            weeks: 12,
            contributors: 4,
            page_size: 2,
            pending_every: 0,
            fail_every: 0,
            seed: 1,
        }
    }
}

/// Deterministic in-memory [`RemoteSource`]
#[derive(Debug)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    latency: Duration,
    page_requests: AtomicUsize,
    statistics_requests: AtomicUsize,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            latency: Duration::ZERO,
            page_requests: AtomicUsize::new(0),
            statistics_requests: AtomicUsize::new(0),
        }
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn statistics_requests(&self) -> usize {
        self.statistics_requests.load(Ordering::SeqCst)
    }

    async fn respond(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn user_listing(&self) -> GroupListing {
        GroupListing {
            id: GroupId(0),
            name: self.config.user.clone(),
            avatar_url: None,
        }
    }

    /// Index of an owner: 0 for the user, `i` for `Gi`
    fn owner_index(&self, owner: &str) -> Option<usize> {
        if owner == self.config.user {
            return Some(0);
        }
        owner
            .strip_prefix('G')
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=self.config.groups).contains(n))
    }

    fn owners(&self) -> Vec<String> {
        std::iter::once(self.config.user.clone())
            .chain((1..=self.config.groups).map(|i| format!("G{i}")))
            .collect()
    }

    /// Count a page request and fail it if it falls on the failure cadence
    fn page_request(&self, operation: &str) -> FetchResult<()> {
        let n = self.page_requests.fetch_add(1, Ordering::SeqCst) + 1;
        if self.config.fail_every > 0 && n % self.config.fail_every == 0 {
            return Err(FetchError::transient(operation, format!("injected failure on request {n}")));
        }
        Ok(())
    }

    /// Slice `items` into the page addressed by `cursor`
    fn paginate<T: Clone>(&self, operation: &str, items: &[T], cursor: Option<Cursor>) -> FetchResult<Page<T>> {
        let start = match cursor {
            None => 0,
            Some(cursor) => cursor
                .as_str()
                .parse::<usize>()
                .map_err(|_| FetchError::malformed(operation, format!("unknown cursor '{cursor}'")))?,
        };
        let page_size = self.config.page_size.max(1);
        let end = (start + page_size).min(items.len());
        let slice = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
        if end < items.len() {
            Ok(Page::with_next(slice, Cursor::new(end.to_string())))
        } else {
            Ok(Page::last(slice))
        }
    }

    /// Repository ids are unique across owners: owner `i` gets `i*m+1..=i*m+m`
    fn repository_id(&self, owner_index: usize, position: usize) -> RepositoryId {
        let per_owner = self.config.repositories as u64;
        RepositoryId(owner_index as u64 * per_owner + position as u64)
    }

    /// Generator for one repository's statistics, stable for a given seed
    fn statistics_rng(&self, full_name: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        full_name.hash(&mut hasher);
        StdRng::seed_from_u64(self.config.seed ^ hasher.finish())
    }

    fn weekly_rows(&self, full_name: &str) -> Vec<WeeklyContribution> {
        let mut rng = self.statistics_rng(full_name);
        let mut rows = Vec::with_capacity(self.config.contributors * self.config.weeks);
        for contributor in 1..=self.config.contributors {
            for week in 0..self.config.weeks {
                // roughly one week in five is idle
                let commits: u64 = if rng.gen_bool(0.2) { 0 } else { rng.gen_range(1..=9) };
                rows.push(WeeklyContribution {
                    login: format!("dev{contributor}"),
                    week_timestamp: FIRST_WEEK + week as i64 * SECONDS_PER_WEEK,
                    additions: commits * rng.gen_range(1..=40),
                    deletions: commits * rng.gen_range(0..15),
                    commits,
                });
            }
        }
        rows
    }
}

#[async_trait]
impl RemoteSource for SyntheticSource {
    async fn authenticated_user(&self) -> FetchResult<GroupListing> {
        self.respond().await;
        Ok(self.user_listing())
    }

    async fn list_groups_page(&self, cursor: Option<Cursor>) -> FetchResult<Page<GroupListing>> {
        self.respond().await;
        self.page_request("list groups")?;
        let groups: Vec<GroupListing> = (1..=self.config.groups)
            .map(|i| GroupListing {
                id: GroupId(i as u64),
                name: format!("G{i}"),
                avatar_url: None,
            })
            .collect();
        self.paginate("list groups", &groups, cursor)
    }

    async fn list_starred_page(&self, cursor: Option<Cursor>) -> FetchResult<Page<String>> {
        self.respond().await;
        self.page_request("list starred")?;
        let starred: Vec<String> = self
            .owners()
            .iter()
            .flat_map(|owner| {
                (1..=self.config.repositories)
                    .filter(|j| j % 3 == 0)
                    .map(move |j| format!("{owner}/R{j}"))
            })
            .collect();
        self.paginate("list starred", &starred, cursor)
    }

    async fn list_repositories_page(
        &self,
        owner: &str,
        cursor: Option<Cursor>,
    ) -> FetchResult<Page<RepositoryListing>> {
        self.respond().await;
        let operation = format!("list repositories of {owner}");
        self.page_request(&operation)?;
        let index = self
            .owner_index(owner)
            .ok_or_else(|| FetchError::transient(&operation, "owner not found"))?;
        let repositories: Vec<RepositoryListing> = (1..=self.config.repositories)
            .map(|j| RepositoryListing {
                id: self.repository_id(index, j),
                name: format!("R{j}"),
                full_name: format!("{owner}/R{j}"),
                url: format!("https://synthetic.invalid/{owner}/R{j}"),
            })
            .collect();
        self.paginate(&operation, &repositories, cursor)
    }

    async fn contributor_statistics(&self, full_name: &str) -> FetchResult<StatisticsResponse> {
        self.respond().await;
        let n = self.statistics_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let owner = full_name.split('/').next().unwrap_or_default();
        if self.owner_index(owner).is_none() {
            return Err(FetchError::transient(
                format!("statistics for {full_name}"),
                "repository not found",
            ));
        }
        if self.config.pending_every > 0 && n % self.config.pending_every == 0 {
            trace!("statistics for {} still computing (request {})", full_name, n);
            return Ok(StatisticsResponse::Pending);
        }
        Ok(StatisticsResponse::Ready(self.weekly_rows(full_name)))
    }
}
