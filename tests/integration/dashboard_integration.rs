//! Dashboard end-to-end tests
//!
//! Tree shape, rollup consistency, the starred filter and change
//! notifications, driven through the public orchestrator API.

mod support;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use contribstats::filter::FilterPredicate;
use contribstats::model::{ContributionFetchState, Dashboard, GroupId, ListingFetchState, RepositoryId};
use contribstats::notifications::{
    DashboardEvent, ListingTarget, NotificationManager, NotificationResult, Subscriber, SummaryScope,
};
use contribstats::orchestrator::{EngineError, FetchOrchestrator};
use contribstats::stats::{Aggregate, ContributionSummary, Metric};

use support::{group, ready, repo, week, ScriptedSource};

/// Records every event it receives
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<DashboardEvent>>,
}

impl Recorder {
    fn take(&self) -> Vec<DashboardEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

#[async_trait]
impl Subscriber<DashboardEvent> for Recorder {
    async fn handle_event(&self, event: DashboardEvent) -> NotificationResult<()> {
        self.events.lock().push(event);
        Ok(())
    }

    fn subscriber_id(&self) -> &str {
        "recorder"
    }
}

/// Two organisations plus the user; "acme/rockets" and "me/dotfiles" are starred
fn scripted_source() -> ScriptedSource {
    let source = ScriptedSource::new("me");
    source.script_groups(vec![Ok(vec![group(2, "zenith"), group(1, "Acme")])]);
    source.script_starred(vec![
        Ok(vec!["Acme/rockets".to_string(), "me/dotfiles".to_string()]),
        Ok(vec!["elsewhere/rockets".to_string()]),
    ]);
    source.script_repositories(
        "Acme",
        vec![
            Ok(vec![repo(12, "Acme", "rockets"), repo(11, "Acme", "Anvils")]),
            Ok(vec![repo(13, "Acme", "bird-seed")]),
        ],
    );
    source.script_repositories("zenith", vec![Ok(vec![repo(20, "zenith", "peak")])]);
    source.script_repositories("me", vec![Ok(vec![repo(30, "me", "dotfiles")])]);

    source.script_statistics("Acme/rockets", vec![ready(vec![week("wile", 0, 100, 20, 5), week("road", 1, 1, 0, 1)])]);
    source.script_statistics("Acme/Anvils", vec![ready(vec![week("wile", 0, 50, 50, 2)])]);
    source.script_statistics("Acme/bird-seed", vec![ready(vec![week("road", 2, 7, 3, 9)])]);
    source.script_statistics("zenith/peak", vec![ready(vec![week("climber", 0, 30, 1, 4)])]);
    source.script_statistics("me/dotfiles", vec![ready(vec![week("me", 0, 3, 3, 1)])]);
    source
}

async fn fully_loaded(starred_only: bool) -> FetchOrchestrator<ScriptedSource> {
    let orchestrator = FetchOrchestrator::new(Arc::new(scripted_source()), FilterPredicate::new(starred_only));
    orchestrator.login().await.expect("login failed");
    let group_ids: Vec<GroupId> = orchestrator.read(|d| d.groups().iter().map(|g| g.id()).collect());
    for id in group_ids {
        orchestrator.query_repositories(id).await.expect("unknown group");
    }
    let repo_ids: Vec<RepositoryId> = orchestrator.read(|d| {
        d.groups()
            .iter()
            .flat_map(|g| g.repositories().iter().map(|r| r.id()))
            .collect()
    });
    for id in repo_ids {
        orchestrator.query_contributions(id).await.expect("unknown repository");
    }
    orchestrator
}

fn assert_rollups_consistent(dashboard: &Dashboard) {
    for group in dashboard.groups() {
        let summary = ContributionSummary::from_summaries(group.repositories().iter().map(|r| r.summary()));
        assert_eq!(group.summary(), &summary, "group {} summary", group.name());
        let matched = ContributionSummary::from_summaries(group.repositories().iter().map(|r| r.matched_summary()));
        assert_eq!(group.matched_summary(), &matched, "group {} matched summary", group.name());
    }
    let total = ContributionSummary::from_summaries(dashboard.groups().iter().map(|g| g.summary()));
    assert_eq!(dashboard.summary(), &total);
}

#[tokio::test]
async fn test_tree_shape_and_ordering() {
    let orchestrator = fully_loaded(false).await;
    orchestrator.read(|d| {
        let groups: Vec<&str> = d.groups().iter().map(|g| g.name()).collect();
        assert_eq!(groups, vec!["Acme", "me", "zenith"]);

        let acme = d.group(GroupId(1)).expect("acme missing");
        let repos: Vec<&str> = acme.repositories().iter().map(|r| r.full_name()).collect();
        assert_eq!(repos, vec!["Acme/Anvils", "Acme/bird-seed", "Acme/rockets"]);
        assert_eq!(acme.fetch_state(), ListingFetchState::Queried);
        assert_eq!(d.repository_count(), 5);

        let (_, rockets) = d.find_repository(RepositoryId(12)).expect("rockets missing");
        assert_eq!(rockets.contributions_url(), "https://example.invalid/Acme/rockets/graphs/code-frequency");
    });
}

#[tokio::test]
async fn test_starred_names_are_scoped_to_their_owner() {
    let orchestrator = fully_loaded(false).await;
    orchestrator.read(|d| {
        let acme = d.group(GroupId(1)).expect("acme missing");
        assert_eq!(acme.starred_repo_names().iter().collect::<Vec<_>>(), vec!["rockets"]);
        let starred: Vec<&str> = acme
            .repositories()
            .iter()
            .filter(|r| r.is_starred())
            .map(|r| r.name())
            .collect();
        assert_eq!(starred, vec!["rockets"]);

        let zenith = d.group(GroupId(2)).expect("zenith missing");
        assert!(zenith.starred_repo_names().is_empty());
    });
}

#[tokio::test]
async fn test_rollups_sum_bottom_up() {
    let orchestrator = fully_loaded(false).await;
    orchestrator.read(|d| {
        assert_rollups_consistent(d);
        assert_eq!(d.summary().total(), Aggregate::new(191, 77, 22));

        let acme = d.group(GroupId(1)).expect("acme missing");
        assert_eq!(acme.summary().total(), Aggregate::new(158, 73, 17));
        assert_eq!(acme.summary().login("wile"), Some(Aggregate::new(150, 70, 7)));
        assert_eq!(acme.summary().ranking(Metric::Commits)[0], "road");
    });
}

#[tokio::test]
async fn test_reset_propagates_to_every_level() {
    let orchestrator = fully_loaded(false).await;
    assert!(orchestrator.reset_contributions(RepositoryId(13)).await.expect("unknown repository"));
    orchestrator.read(|d| {
        assert_rollups_consistent(d);
        assert_eq!(d.summary().total(), Aggregate::new(184, 74, 13));
        let (_, seed) = d.find_repository(RepositoryId(13)).expect("bird-seed missing");
        assert_eq!(seed.fetch_state(), ContributionFetchState::NotQueried);
        assert!(seed.contributions().is_empty());
    });
}

#[tokio::test]
async fn test_relisting_preserves_loaded_repositories() {
    let orchestrator = fully_loaded(false).await;
    orchestrator
        .source()
        .script_repositories("Acme", vec![Ok(vec![repo(12, "Acme", "rockets-renamed"), repo(14, "Acme", "new")])]);

    orchestrator.query_repositories(GroupId(1)).await.expect("unknown group");
    orchestrator.read(|d| {
        let acme = d.group(GroupId(1)).expect("acme missing");
        let names: Vec<&str> = acme.repositories().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["new", "rockets-renamed"]);

        let (_, kept) = d.find_repository(RepositoryId(12)).expect("kept repository missing");
        assert_eq!(kept.fetch_state(), ContributionFetchState::Loaded);
        assert_eq!(kept.summary().total(), Aggregate::new(101, 20, 6));
        // starred flag follows the new name
        assert!(!kept.is_starred());

        let (_, fresh) = d.find_repository(RepositoryId(14)).expect("new repository missing");
        assert_eq!(fresh.fetch_state(), ContributionFetchState::NotQueried);
        assert_rollups_consistent(d);
    });
}

#[tokio::test]
async fn test_filter_toggle_hides_and_restores() {
    let orchestrator = fully_loaded(false).await;
    let unfiltered = orchestrator.read(|d| d.summary().clone());

    assert!(orchestrator.set_filter(true).await);
    assert!(!orchestrator.set_filter(true).await);
    orchestrator.read(|d| {
        let visible: Vec<&str> = d.visible_groups().map(|g| g.name()).collect();
        assert_eq!(visible, vec!["Acme", "me"]);

        let filter = *d.filter();
        let acme = d.group(GroupId(1)).expect("acme missing");
        let repos: Vec<&str> = acme.visible_repositories(&filter).map(|r| r.name()).collect();
        assert_eq!(repos, vec!["rockets"]);

        // the grand total is the unfiltered rollup regardless of the filter
        assert_eq!(d.summary(), &unfiltered);
        assert_rollups_consistent(d);
    });

    assert!(orchestrator.set_filter(false).await);
    orchestrator.read(|d| {
        assert_eq!(d.visible_groups().count(), 3);
        assert_eq!(d.summary(), &unfiltered);
    });
}

#[tokio::test]
async fn test_unknown_ids_are_rejected() {
    let orchestrator = fully_loaded(false).await;
    assert_eq!(
        orchestrator.query_repositories(GroupId(404)).await,
        Err(EngineError::UnknownGroup(GroupId(404)))
    );
    assert_eq!(
        orchestrator.query_contributions(RepositoryId(404)).await,
        Err(EngineError::UnknownRepository(RepositoryId(404)))
    );
}

#[tokio::test]
async fn test_statistics_events_follow_the_mutation() {
    let orchestrator = fully_loaded(false).await;
    let recorder = Arc::new(Recorder::default());
    orchestrator.notifier().subscribe(recorder.clone()).await.expect("subscribe failed");

    orchestrator.query_contributions(RepositoryId(20)).await.expect("unknown repository");
    assert_eq!(
        recorder.take(),
        vec![
            DashboardEvent::ContributionFetchChanged {
                repository_id: RepositoryId(20),
                state: ContributionFetchState::Querying,
            },
            DashboardEvent::ContributionsChanged {
                repository_id: RepositoryId(20),
                record_count: 1,
            },
            DashboardEvent::SummaryRecomputed {
                scope: SummaryScope::Repository(RepositoryId(20)),
            },
            DashboardEvent::SummaryRecomputed {
                scope: SummaryScope::Group(GroupId(2)),
            },
            DashboardEvent::SummaryRecomputed {
                scope: SummaryScope::Dashboard,
            },
            DashboardEvent::ContributionFetchChanged {
                repository_id: RepositoryId(20),
                state: ContributionFetchState::Loaded,
            },
        ]
    );
}

#[tokio::test]
async fn test_listing_and_session_events() {
    let orchestrator = FetchOrchestrator::new(Arc::new(scripted_source()), FilterPredicate::default());
    let recorder = Arc::new(Recorder::default());
    orchestrator.notifier().subscribe(recorder.clone()).await.expect("subscribe failed");

    orchestrator.login().await.expect("login failed");
    let events = recorder.take();
    assert_eq!(events.first(), Some(&DashboardEvent::LoggedIn { login: "me".to_string() }));
    assert!(events.contains(&DashboardEvent::GroupsChanged { group_count: 3 }));
    assert_eq!(
        events.last(),
        Some(&DashboardEvent::ListingFetchChanged {
            target: ListingTarget::Groups,
            state: ListingFetchState::Queried,
        })
    );

    orchestrator.logout().await;
    let events = recorder.take();
    assert_eq!(events.last(), Some(&DashboardEvent::LoggedOut));
    assert!(events.contains(&DashboardEvent::GroupsChanged { group_count: 0 }));

    let stats = orchestrator.notifier().stats().await;
    assert_eq!(stats.delivery_failures, 0);
}
