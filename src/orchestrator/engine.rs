//! Fetch orchestration over the contribution tree
//!
//! Every entry point follows the same shape: take the tree lock, record the
//! transition into `Querying` together with the token the completion must
//! present, release the lock, await the remote source, then re-take the lock
//! and apply the result only if the token is still current. Events are
//! published after the lock is released.

use std::collections::BTreeSet;
use std::sync::Arc;
use log::{debug, error, info, warn};
use parking_lot::Mutex;

use super::error::{EngineError, EngineResult};
use crate::filter::FilterPredicate;
use crate::model::{
    from_weeks, ContributionFetchState, ContributionRecord, Dashboard, FetchOutcome, GroupId, GroupInfo,
    ListingFetchState, RepositoryId,
};
use crate::notifications::{
    AsyncNotificationManager, DashboardEvent, ListingTarget, NotificationManager, SummaryScope,
};
use crate::remote::{collect_all_pages, FetchError, FetchResult, RemoteSource, StatisticsResponse};

/// Completion of a group or repository listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// The listing was stored; `count` children are now present
    Queried { count: usize },
    /// A page failed; the previously stored children are untouched
    Failed(FetchError),
    /// The session or the owning node changed while the listing was in flight
    Discarded,
}

impl ListingOutcome {
    pub fn is_queried(&self) -> bool {
        matches!(self, ListingOutcome::Queried { .. })
    }
}

/// Names starred within `owner`, from entries qualified as `owner/name`
pub fn starred_names_for(owner: &str, starred: &[String]) -> BTreeSet<String> {
    starred
        .iter()
        .filter_map(|qualified| qualified.strip_prefix(owner)?.strip_prefix('/'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drives the fetch state machines and lands remote results in the tree
pub struct FetchOrchestrator<S: RemoteSource + ?Sized> {
    source: Arc<S>,
    dashboard: Arc<Mutex<Dashboard>>,
    notifier: AsyncNotificationManager<DashboardEvent>,
}

impl<S: RemoteSource + ?Sized> FetchOrchestrator<S> {
    pub fn new(source: Arc<S>, filter: FilterPredicate) -> Self {
        Self::with_notifier(source, filter, AsyncNotificationManager::new())
    }

    pub fn with_notifier(
        source: Arc<S>,
        filter: FilterPredicate,
        notifier: AsyncNotificationManager<DashboardEvent>,
    ) -> Self {
        Self {
            source,
            dashboard: Arc::new(Mutex::new(Dashboard::new(filter))),
            notifier,
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The manager subscribers register with
    pub fn notifier(&self) -> &AsyncNotificationManager<DashboardEvent> {
        &self.notifier
    }

    /// Copy of the whole tree
    pub fn snapshot(&self) -> Dashboard {
        self.dashboard.lock().clone()
    }

    /// Read the tree in place without copying it
    pub fn read<R>(&self, f: impl FnOnce(&Dashboard) -> R) -> R {
        f(&self.dashboard.lock())
    }

    async fn emit(&self, events: Vec<DashboardEvent>) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.publish_all(events).await {
            warn!("Dropped dashboard notifications: {}", e);
        }
    }

    /// Authenticate, then list groups for the new identity
    pub async fn login(&self) -> EngineResult<ListingOutcome> {
        let identity = self.source.authenticated_user().await.map_err(EngineError::Login)?;
        info!("Logged in as {}", identity.name);

        let login = identity.name.clone();
        self.dashboard.lock().set_identity(identity);
        self.emit(vec![DashboardEvent::LoggedIn { login }]).await;

        Ok(self.query_groups().await)
    }

    /// Drop the tree and invalidate every in-flight fetch
    pub async fn logout(&self) {
        {
            let mut dashboard = self.dashboard.lock();
            dashboard.clear();
            debug!("Logged out (session epoch {})", dashboard.session_epoch());
        }
        self.emit(vec![
            DashboardEvent::GroupsChanged { group_count: 0 },
            DashboardEvent::summary(SummaryScope::Dashboard),
            DashboardEvent::listing_fetch(ListingTarget::Groups, ListingFetchState::NotQueried),
            DashboardEvent::LoggedOut,
        ])
        .await;
    }

    /// List groups (and starred repositories) and replace the group collection
    pub async fn query_groups(&self) -> ListingOutcome {
        let epoch = {
            let mut dashboard = self.dashboard.lock();
            dashboard.begin_listing();
            dashboard.session_epoch()
        };
        self.emit(vec![DashboardEvent::listing_fetch(
            ListingTarget::Groups,
            ListingFetchState::Querying,
        )])
        .await;

        let result = self.fetch_group_listing().await;

        let (outcome, events) = {
            let mut dashboard = self.dashboard.lock();
            if dashboard.session_epoch() != epoch {
                debug!("Discarding group listing from an earlier session");
                (ListingOutcome::Discarded, Vec::new())
            } else {
                match result {
                    Ok((mut groups, starred)) => {
                        if let Some(identity) = dashboard.identity() {
                            if !groups.iter().any(|group| group.id == identity.id) {
                                groups.push(identity.clone());
                            }
                        }
                        dashboard.replace_groups(groups);
                        for group in dashboard.groups_mut() {
                            let derived = starred_names_for(group.name(), &starred);
                            group.set_starred_repo_names(derived);
                        }

                        let count = dashboard.groups().len();
                        info!("Listed {} groups", count);
                        (
                            ListingOutcome::Queried { count },
                            vec![
                                DashboardEvent::GroupsChanged { group_count: count },
                                DashboardEvent::summary(SummaryScope::Dashboard),
                                DashboardEvent::listing_fetch(ListingTarget::Groups, dashboard.fetch_state()),
                            ],
                        )
                    }
                    Err(e) => {
                        Self::log_failure(&e);
                        dashboard.fail_listing();
                        (
                            ListingOutcome::Failed(e),
                            vec![DashboardEvent::listing_fetch(ListingTarget::Groups, dashboard.fetch_state())],
                        )
                    }
                }
            }
        };

        self.emit(events).await;
        outcome
    }

    async fn fetch_group_listing(&self) -> FetchResult<(Vec<GroupInfo>, Vec<String>)> {
        let source = &self.source;
        let groups = collect_all_pages("list groups", |cursor| source.list_groups_page(cursor)).await?;
        let starred = collect_all_pages("list starred", |cursor| source.list_starred_page(cursor)).await?;
        Ok((groups, starred))
    }

    /// List a group's repositories and replace its repository collection
    pub async fn query_repositories(&self, group_id: GroupId) -> EngineResult<ListingOutcome> {
        let (epoch, token, owner) = {
            let mut dashboard = self.dashboard.lock();
            let epoch = dashboard.session_epoch();
            let group = dashboard
                .group_mut(group_id)
                .ok_or(EngineError::UnknownGroup(group_id))?;
            group.begin_listing();
            (epoch, group.generation(), group.name().to_string())
        };
        let target = ListingTarget::Repositories(group_id);
        self.emit(vec![DashboardEvent::listing_fetch(target, ListingFetchState::Querying)])
            .await;

        let operation = format!("list repositories of {owner}");
        let source = &self.source;
        let owner_ref = owner.as_str();
        let result = collect_all_pages(&operation, |cursor| source.list_repositories_page(owner_ref, cursor)).await;

        let (outcome, events) = {
            let mut dashboard = self.dashboard.lock();
            let current = dashboard.session_epoch() == epoch
                && dashboard
                    .group(group_id)
                    .is_some_and(|group| group.generation() == token);
            if !current {
                debug!("Discarding repository listing of {}", owner);
                (ListingOutcome::Discarded, Vec::new())
            } else {
                match result {
                    Ok(listing) => {
                        let count = dashboard.replace_repositories(group_id, listing).unwrap_or_default();
                        let state = dashboard
                            .group(group_id)
                            .map(|group| group.fetch_state())
                            .unwrap_or_default();
                        info!("Listed {} repositories of {}", count, owner);
                        (
                            ListingOutcome::Queried { count },
                            vec![
                                DashboardEvent::RepositoriesChanged {
                                    group_id,
                                    repository_count: count,
                                },
                                DashboardEvent::summary(SummaryScope::Group(group_id)),
                                DashboardEvent::summary(SummaryScope::Dashboard),
                                DashboardEvent::listing_fetch(target, state),
                            ],
                        )
                    }
                    Err(e) => {
                        Self::log_failure(&e);
                        let state = match dashboard.group_mut(group_id) {
                            Some(group) => {
                                group.fail_listing();
                                group.fetch_state()
                            }
                            None => ListingFetchState::NotQueried,
                        };
                        (
                            ListingOutcome::Failed(e),
                            vec![DashboardEvent::listing_fetch(target, state)],
                        )
                    }
                }
            }
        };

        self.emit(events).await;
        Ok(outcome)
    }

    /// Fetch a repository's contributor statistics
    ///
    /// Returns the tri-state result; `Discarded` when the repository was
    /// reset, removed, or the session ended before the response arrived.
    pub async fn query_contributions(&self, repository_id: RepositoryId) -> EngineResult<FetchOutcome> {
        let (epoch, token, full_name) = {
            let mut dashboard = self.dashboard.lock();
            let epoch = dashboard.session_epoch();
            let repo = dashboard
                .repository_mut(repository_id)
                .ok_or(EngineError::UnknownRepository(repository_id))?;
            let token = repo.begin_query();
            (epoch, token, repo.full_name().to_string())
        };
        self.emit(vec![DashboardEvent::contribution_fetch(
            repository_id,
            ContributionFetchState::Querying,
        )])
        .await;

        let result = self.fetch_records(&full_name).await;

        let (outcome, events) = {
            let mut dashboard = self.dashboard.lock();
            let filter = *dashboard.filter();
            let current = dashboard.session_epoch() == epoch;
            let owner = dashboard.owner_of(repository_id);
            match (dashboard.repository_mut(repository_id), owner) {
                (Some(repo), Some(group_id)) if current && repo.accepts(token) => match result {
                    Ok(Some(records)) => {
                        let record_count = records.len();
                        repo.complete_loaded(records, &filter);
                        dashboard.propagate_from_group(group_id);
                        debug!("Loaded {} contribution records for {}", record_count, full_name);
                        (
                            FetchOutcome::Loaded,
                            vec![
                                DashboardEvent::ContributionsChanged {
                                    repository_id,
                                    record_count,
                                },
                                DashboardEvent::summary(SummaryScope::Repository(repository_id)),
                                DashboardEvent::summary(SummaryScope::Group(group_id)),
                                DashboardEvent::summary(SummaryScope::Dashboard),
                                DashboardEvent::contribution_fetch(repository_id, ContributionFetchState::Loaded),
                            ],
                        )
                    }
                    Ok(None) => {
                        warn!("Statistics for {} are still being computed", full_name);
                        repo.complete_pending();
                        (
                            FetchOutcome::Pending,
                            vec![DashboardEvent::contribution_fetch(repository_id, ContributionFetchState::Pending)],
                        )
                    }
                    Err(e) => {
                        Self::log_failure(&e);
                        repo.complete_failed();
                        (
                            FetchOutcome::Failed,
                            vec![DashboardEvent::contribution_fetch(repository_id, ContributionFetchState::Failed)],
                        )
                    }
                },
                _ => {
                    warn!("Discarding stale statistics for {}", full_name);
                    (FetchOutcome::Discarded, Vec::new())
                }
            }
        };

        self.emit(events).await;
        Ok(outcome)
    }

    /// `Ok(None)` means the source is still computing
    async fn fetch_records(&self, full_name: &str) -> FetchResult<Option<Vec<ContributionRecord>>> {
        match self.source.contributor_statistics(full_name).await? {
            StatisticsResponse::Pending => Ok(None),
            StatisticsResponse::Ready(weeks) => from_weeks(weeks)
                .map(Some)
                .map_err(|e| FetchError::invalid_week(full_name, e)),
        }
    }

    /// Clear a repository's contributions and orphan any in-flight query
    ///
    /// Returns false when the repository had nothing to reset.
    pub async fn reset_contributions(&self, repository_id: RepositoryId) -> EngineResult<bool> {
        let events = {
            let mut dashboard = self.dashboard.lock();
            let filter = *dashboard.filter();
            let group_id = dashboard
                .owner_of(repository_id)
                .ok_or(EngineError::UnknownRepository(repository_id))?;
            let generation = dashboard.next_token();
            let repo = dashboard
                .repository_mut(repository_id)
                .ok_or(EngineError::UnknownRepository(repository_id))?;
            if !repo.fetch_state().is_resettable() {
                return Ok(false);
            }
            repo.reset(&filter, generation);
            dashboard.propagate_from_group(group_id);
            debug!("Reset contributions of {}", repository_id);
            vec![
                DashboardEvent::ContributionsChanged {
                    repository_id,
                    record_count: 0,
                },
                DashboardEvent::summary(SummaryScope::Repository(repository_id)),
                DashboardEvent::summary(SummaryScope::Group(group_id)),
                DashboardEvent::summary(SummaryScope::Dashboard),
                DashboardEvent::contribution_fetch(repository_id, ContributionFetchState::NotQueried),
            ]
        };
        self.emit(events).await;
        Ok(true)
    }

    /// Toggle the starred-only filter and recompute every matched rollup
    ///
    /// Returns false when the flag already had this value.
    pub async fn set_filter(&self, starred_only: bool) -> bool {
        let events = {
            let mut dashboard = self.dashboard.lock();
            if !dashboard.set_filter(starred_only) {
                return false;
            }
            let mut events = vec![DashboardEvent::FilterChanged { starred_only }];
            for group in dashboard.groups() {
                events.extend(
                    group
                        .repositories()
                        .iter()
                        .map(|repo| DashboardEvent::summary(SummaryScope::Repository(repo.id()))),
                );
                events.push(DashboardEvent::summary(SummaryScope::Group(group.id())));
            }
            events.push(DashboardEvent::summary(SummaryScope::Dashboard));
            events
        };
        debug!("Filter set to starred_only={}", starred_only);
        self.emit(events).await;
        true
    }

    fn log_failure(e: &FetchError) {
        if e.is_malformed() {
            error!("{}", e);
        } else {
            warn!("{}", e);
        }
    }
}
