//! Dashboard run: login, fan-out fetches, report

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::filter::FilterPredicate;
use crate::model::{ContributionFetchState, FetchOutcome, GroupId, RepositoryId};
use crate::notifications::{
    AsyncNotificationManager, DashboardEvent, NotificationManager, NotificationResult, Subscriber,
};
use crate::orchestrator::{FetchOrchestrator, ListingOutcome};
use crate::output::{self, ReportOptions};
use crate::remote::{RemoteSource, SyntheticSource};
use crate::{cli, config};

/// Counts settled contribution fetches as they are announced
#[derive(Debug, Default)]
pub struct FetchTally {
    loaded: AtomicUsize,
    pending: AtomicUsize,
    failed: AtomicUsize,
}

impl FetchTally {
    pub const SUBSCRIBER_ID: &'static str = "fetch-tally";

    pub fn loaded(&self) -> usize {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Subscriber<DashboardEvent> for FetchTally {
    async fn handle_event(&self, event: DashboardEvent) -> NotificationResult<()> {
        if let DashboardEvent::ContributionFetchChanged { repository_id, state } = event {
            debug!("{} is now {}", repository_id, state);
            let counter = match state {
                ContributionFetchState::Loaded => &self.loaded,
                ContributionFetchState::Pending => &self.pending,
                ContributionFetchState::Failed => &self.failed,
                _ => return Ok(()),
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn subscriber_id(&self) -> &str {
        Self::SUBSCRIBER_ID
    }

    fn should_receive(&self, event: &DashboardEvent) -> bool {
        matches!(event, DashboardEvent::ContributionFetchChanged { .. })
    }
}

/// Query every listed group's repositories concurrently
pub async fn load_repositories<S>(orchestrator: &FetchOrchestrator<S>) -> Result<usize>
where
    S: RemoteSource + ?Sized,
{
    let group_ids: Vec<GroupId> = orchestrator.read(|dashboard| dashboard.groups().iter().map(|group| group.id()).collect());
    let outcomes = join_all(group_ids.iter().map(|&id| orchestrator.query_repositories(id))).await;

    let mut listed = 0;
    for (id, outcome) in group_ids.iter().zip(outcomes) {
        match outcome? {
            ListingOutcome::Queried { .. } => listed += 1,
            ListingOutcome::Failed(e) => warn!("Could not list repositories of {}: {}", id, e),
            ListingOutcome::Discarded => debug!("Repository listing of {} discarded", id),
        }
    }
    Ok(listed)
}

/// Query statistics for the given repositories concurrently; returns those still pending
pub async fn load_contributions<S>(orchestrator: &FetchOrchestrator<S>, repository_ids: &[RepositoryId]) -> Result<Vec<RepositoryId>>
where
    S: RemoteSource + ?Sized,
{
    let outcomes = join_all(repository_ids.iter().map(|&id| orchestrator.query_contributions(id))).await;

    let mut pending = Vec::new();
    for (&id, outcome) in repository_ids.iter().zip(outcomes) {
        if outcome? == FetchOutcome::Pending {
            pending.push(id);
        }
    }
    Ok(pending)
}

/// Login, fetch the whole tree (retrying pending statistics once), then apply the filter
pub async fn populate_dashboard<S>(orchestrator: &FetchOrchestrator<S>, starred_only: bool) -> Result<()>
where
    S: RemoteSource + ?Sized,
{
    match orchestrator.login().await? {
        ListingOutcome::Queried { count } => info!("Listed {} groups", count),
        ListingOutcome::Failed(e) => return Err(e).context("Failed to list groups"),
        ListingOutcome::Discarded => anyhow::bail!("Group listing was superseded"),
    }

    let listed = load_repositories(orchestrator).await?;
    debug!("Listed repositories for {} groups", listed);

    let repository_ids: Vec<RepositoryId> = orchestrator.read(|dashboard| {
        dashboard
            .groups()
            .iter()
            .flat_map(|group| group.repositories().iter().map(|repo| repo.id()))
            .collect()
    });
    let pending = load_contributions(orchestrator, &repository_ids).await?;
    if !pending.is_empty() {
        info!("Statistics pending for {} repositories, retrying once", pending.len());
        let still_pending = load_contributions(orchestrator, &pending).await?;
        if !still_pending.is_empty() {
            warn!("Statistics still pending for {} repositories", still_pending.len());
        }
    }

    orchestrator.set_filter(starred_only).await;
    Ok(())
}

pub async fn run_dashboard(args: &cli::Args, config: &config::ConfigManager, colours: &crate::display::ColourManager) -> Result<()> {
    let synthetic = args.apply_to_synthetic(config.synthetic_config()?);
    let settings = config.notification_settings()?;
    let starred_only = args.starred_only || config.get_bool("filter", "starred-only")?.unwrap_or(false);

    debug!("Synthetic source: {:?}", synthetic);
    let source = Arc::new(SyntheticSource::new(synthetic));
    let notifier = AsyncNotificationManager::with_config(settings.timeout, settings.max_subscribers);
    let orchestrator = FetchOrchestrator::with_notifier(source, FilterPredicate::default(), notifier);

    let tally = Arc::new(FetchTally::default());
    orchestrator
        .notifier()
        .subscribe(tally.clone())
        .await
        .context("Failed to register fetch tally")?;

    populate_dashboard(&orchestrator, starred_only).await?;

    info!(
        "Statistics: {} loaded, {} pending, {} failed",
        tally.loaded(),
        tally.pending(),
        tally.failed()
    );

    let options = ReportOptions {
        format: args.output_format(),
        top: args.top,
        rank_by: args.rank_metric()?,
    };
    orchestrator.read(|dashboard| output::display_dashboard_report(dashboard, &options, colours));

    orchestrator.notifier().shutdown().await.context("Failed to shut down notifications")?;
    Ok(())
}
