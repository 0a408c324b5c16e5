//! Fetch lifecycle tests
//!
//! Pagination all-or-nothing, pending and failed statistics, and completions
//! that arrive after a reset or logout.

mod support;

use std::sync::Arc;

use contribstats::filter::FilterPredicate;
use contribstats::model::{ContributionFetchState, FetchOutcome, GroupId, ListingFetchState, RepositoryId};
use contribstats::orchestrator::{EngineError, FetchOrchestrator, ListingOutcome};
use contribstats::remote::{FetchError, StatisticsResponse};
use contribstats::stats::Aggregate;

use support::{group, ready, repo, week, ScriptedSource};

fn orchestrator(source: ScriptedSource) -> Arc<FetchOrchestrator<ScriptedSource>> {
    Arc::new(FetchOrchestrator::new(Arc::new(source), FilterPredicate::default()))
}

/// Source with one organisation "acme" owning a single repository "acme/rockets"
fn single_repository_source() -> ScriptedSource {
    let source = ScriptedSource::new("me");
    source.script_groups(vec![Ok(vec![group(1, "acme")])]);
    source.script_repositories("acme", vec![Ok(vec![repo(10, "acme", "rockets")])]);
    source
}

async fn listed(source: ScriptedSource) -> Arc<FetchOrchestrator<ScriptedSource>> {
    let orchestrator = orchestrator(source);
    orchestrator.login().await.expect("login failed");
    orchestrator
        .query_repositories(GroupId(1))
        .await
        .expect("unknown group");
    orchestrator
}

fn repository_state(orchestrator: &FetchOrchestrator<ScriptedSource>, id: u64) -> ContributionFetchState {
    orchestrator.read(|d| {
        d.find_repository(RepositoryId(id))
            .map(|(_, repo)| repo.fetch_state())
            .expect("repository missing")
    })
}

fn repository_total(orchestrator: &FetchOrchestrator<ScriptedSource>, id: u64) -> Aggregate {
    orchestrator.read(|d| {
        d.find_repository(RepositoryId(id))
            .map(|(_, repo)| repo.summary().total())
            .expect("repository missing")
    })
}

/// Wait until the spawned query has reached the gated statistics call
async fn wait_for_querying(orchestrator: &FetchOrchestrator<ScriptedSource>, id: u64) {
    for _ in 0..1000 {
        if repository_state(orchestrator, id) == ContributionFetchState::Querying
            && orchestrator.source().statistics_requests() > 0
        {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("query never started");
}

#[tokio::test]
async fn test_group_listing_follows_every_page() {
    let source = ScriptedSource::new("me");
    source.script_groups(vec![
        Ok(vec![group(1, "acme")]),
        Ok(vec![group(2, "Beta")]),
        Ok(vec![group(3, "cobalt")]),
    ]);
    let orchestrator = orchestrator(source);

    let outcome = orchestrator.login().await.expect("login failed");
    assert_eq!(outcome, ListingOutcome::Queried { count: 4 });

    let names: Vec<String> = orchestrator.read(|d| d.groups().iter().map(|g| g.name().to_string()).collect());
    assert_eq!(names, vec!["acme", "Beta", "cobalt", "me"]);
    // three group pages plus one starred page
    assert_eq!(orchestrator.source().page_requests(), 4);
}

#[tokio::test]
async fn test_failed_second_page_leaves_groups_untouched() {
    let source = ScriptedSource::new("me");
    source.script_groups(vec![Ok(vec![group(1, "acme")])]);
    let orchestrator = orchestrator(source);
    orchestrator.login().await.expect("login failed");
    let before: Vec<GroupId> = orchestrator.read(|d| d.groups().iter().map(|g| g.id()).collect());

    orchestrator.source().script_groups(vec![
        Ok(vec![group(1, "acme"), group(2, "beta")]),
        Err(FetchError::transient("list groups", "connection reset")),
        Ok(vec![group(3, "cobalt")]),
    ]);
    let requests = orchestrator.source().page_requests();

    let outcome = orchestrator.query_groups().await;
    assert!(matches!(outcome, ListingOutcome::Failed(FetchError::Transient { .. })));
    // page 1 and the failing page 2; page 3 is never requested
    assert_eq!(orchestrator.source().page_requests(), requests + 2);

    orchestrator.read(|d| {
        let after: Vec<GroupId> = d.groups().iter().map(|g| g.id()).collect();
        assert_eq!(after, before);
        assert_eq!(d.fetch_state(), ListingFetchState::Queried);
    });
}

#[tokio::test]
async fn test_failed_first_listing_reverts_to_not_queried() {
    let source = ScriptedSource::new("me");
    source.script_groups(vec![Err(FetchError::transient("list groups", "503"))]);
    let orchestrator = orchestrator(source);

    let outcome = orchestrator.login().await.expect("login failed");
    assert!(!outcome.is_queried());
    orchestrator.read(|d| {
        assert!(d.groups().is_empty());
        assert_eq!(d.fetch_state(), ListingFetchState::NotQueried);
    });
}

#[tokio::test]
async fn test_failed_repository_page_keeps_previous_listing() {
    let orchestrator = listed(single_repository_source()).await;
    orchestrator.source().script_repositories(
        "acme",
        vec![
            Ok(vec![repo(10, "acme", "rockets"), repo(11, "acme", "anvils")]),
            Err(FetchError::malformed("list repositories", "missing id")),
        ],
    );

    let outcome = orchestrator.query_repositories(GroupId(1)).await.expect("unknown group");
    assert!(matches!(outcome, ListingOutcome::Failed(FetchError::Malformed { .. })));
    orchestrator.read(|d| {
        let group = d.group(GroupId(1)).expect("group missing");
        assert_eq!(group.repositories().len(), 1);
        assert_eq!(group.fetch_state(), ListingFetchState::Queried);
    });
}

#[tokio::test]
async fn test_loaded_statistics_drop_zero_commit_weeks() {
    let source = single_repository_source();
    source.script_statistics(
        "acme/rockets",
        vec![ready(vec![
            week("alice", 0, 10, 2, 3),
            week("alice", 1, 0, 0, 0),
            week("bob", 0, 4, 4, 1),
        ])],
    );
    let orchestrator = listed(source).await;

    let outcome = orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Loaded);
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::Loaded);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::new(14, 6, 4));
    orchestrator.read(|d| {
        let (_, repo) = d.find_repository(RepositoryId(10)).expect("repository missing");
        assert_eq!(repo.contributions().len(), 2);
    });
}

#[tokio::test]
async fn test_empty_statistics_still_load() {
    let source = single_repository_source();
    source.script_statistics("acme/rockets", vec![ready(Vec::new())]);
    let orchestrator = listed(source).await;

    let outcome = orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Loaded);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::ZERO);
}

#[tokio::test]
async fn test_pending_keeps_contributions_and_stays_queryable() {
    let source = single_repository_source();
    source.script_statistics(
        "acme/rockets",
        vec![
            ready(vec![week("alice", 0, 10, 2, 3)]),
            Ok(StatisticsResponse::Pending),
            ready(vec![week("alice", 0, 10, 2, 3), week("bob", 1, 1, 1, 1)]),
        ],
    );
    let orchestrator = listed(source).await;

    assert_eq!(
        orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo"),
        FetchOutcome::Loaded
    );
    assert_eq!(
        orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo"),
        FetchOutcome::Pending
    );
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::Pending);
    assert!(repository_state(&orchestrator, 10).is_queryable());
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::new(10, 2, 3));

    assert_eq!(
        orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo"),
        FetchOutcome::Loaded
    );
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::new(11, 3, 4));
}

#[tokio::test]
async fn test_failed_statistics_keep_previous_contributions() {
    let source = single_repository_source();
    source.script_statistics(
        "acme/rockets",
        vec![
            ready(vec![week("alice", 0, 10, 2, 3)]),
            Err(FetchError::transient("statistics", "timeout")),
        ],
    );
    let orchestrator = listed(source).await;

    orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo");
    let outcome = orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Failed);
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::Failed);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::new(10, 2, 3));
}

#[tokio::test]
async fn test_invalid_week_is_a_failed_fetch() {
    let source = single_repository_source();
    let mut bad = week("alice", 0, 1, 1, 1);
    bad.week_timestamp = i64::MAX;
    source.script_statistics("acme/rockets", vec![ready(vec![bad])]);
    let orchestrator = listed(source).await;

    let outcome = orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Failed);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::ZERO);
}

#[tokio::test]
async fn test_completion_after_reset_is_discarded() {
    let source = single_repository_source();
    source.script_statistics("acme/rockets", vec![ready(vec![week("alice", 0, 10, 2, 3)])]);
    let gate = source.gate_statistics();
    let orchestrator = listed(source).await;

    let query = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.query_contributions(RepositoryId(10)).await })
    };
    wait_for_querying(&orchestrator, 10).await;

    assert!(orchestrator.reset_contributions(RepositoryId(10)).await.expect("unknown repo"));
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::NotQueried);

    gate.add_permits(1);
    let outcome = query.await.expect("query task panicked").expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Discarded);
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::NotQueried);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::ZERO);

    // a fresh query is accepted again
    gate.add_permits(1);
    let outcome = orchestrator.query_contributions(RepositoryId(10)).await.expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Loaded);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::new(10, 2, 3));
}

#[tokio::test]
async fn test_completion_after_logout_is_discarded() {
    let source = single_repository_source();
    source.script_statistics("acme/rockets", vec![ready(vec![week("alice", 0, 10, 2, 3)])]);
    let gate = source.gate_statistics();
    let orchestrator = listed(source).await;

    let query = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.query_contributions(RepositoryId(10)).await })
    };
    wait_for_querying(&orchestrator, 10).await;

    orchestrator.logout().await;
    gate.add_permits(1);

    let outcome = query.await.expect("query task panicked").expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Discarded);
    orchestrator.read(|d| {
        assert!(d.groups().is_empty());
        assert!(d.summary().is_empty());
        assert!(d.identity().is_none());
    });
}

#[tokio::test]
async fn test_completion_for_relisted_repository_is_discarded() {
    let source = single_repository_source();
    source.script_statistics("acme/rockets", vec![ready(vec![week("alice", 0, 10, 2, 3)])]);
    let gate = source.gate_statistics();
    let orchestrator = listed(source).await;

    let query = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.query_contributions(RepositoryId(10)).await })
    };
    wait_for_querying(&orchestrator, 10).await;

    // drop the repository, then list it again under the same id
    orchestrator.source().script_repositories("acme", vec![Ok(Vec::new())]);
    orchestrator.query_repositories(GroupId(1)).await.expect("unknown group");
    orchestrator.read(|d| assert!(d.find_repository(RepositoryId(10)).is_none()));
    orchestrator
        .source()
        .script_repositories("acme", vec![Ok(vec![repo(10, "acme", "rockets")])]);
    orchestrator.query_repositories(GroupId(1)).await.expect("unknown group");
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::NotQueried);

    gate.add_permits(1);
    let outcome = query.await.expect("query task panicked").expect("unknown repo");
    assert_eq!(outcome, FetchOutcome::Discarded);
    assert_eq!(repository_state(&orchestrator, 10), ContributionFetchState::NotQueried);
    assert_eq!(repository_total(&orchestrator, 10), Aggregate::ZERO);
}

#[tokio::test]
async fn test_listing_for_relisted_group_is_discarded() {
    let source = single_repository_source();
    let orchestrator = orchestrator(source);
    orchestrator.login().await.expect("login failed");
    let gate = orchestrator.source().gate_repositories();

    let listing = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.query_repositories(GroupId(1)).await })
    };
    for _ in 0..1000 {
        if orchestrator.source().repository_requests() > 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(orchestrator.source().repository_requests() > 0);

    // drop the group, then list it again under the same id
    orchestrator.source().script_groups(vec![Ok(Vec::new())]);
    assert!(orchestrator.query_groups().await.is_queried());
    orchestrator.source().script_groups(vec![Ok(vec![group(1, "acme")])]);
    assert!(orchestrator.query_groups().await.is_queried());

    gate.add_permits(1);
    let outcome = listing.await.expect("listing task panicked").expect("unknown group");
    assert_eq!(outcome, ListingOutcome::Discarded);
    orchestrator.read(|d| {
        let acme = d.group(GroupId(1)).expect("group missing");
        assert_eq!(acme.fetch_state(), ListingFetchState::NotQueried);
        assert!(acme.repositories().is_empty());
    });
}

#[tokio::test]
async fn test_reset_of_unqueried_repository_is_a_no_op() {
    let orchestrator = listed(single_repository_source()).await;
    assert!(!orchestrator.reset_contributions(RepositoryId(10)).await.expect("unknown repo"));
    assert_eq!(
        orchestrator.reset_contributions(RepositoryId(99)).await,
        Err(EngineError::UnknownRepository(RepositoryId(99)))
    );
}
