//! Scripted remote source shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use contribstats::model::{GroupId, GroupInfo, RepositoryId, RepositoryInfo, WeeklyContribution};
use contribstats::remote::{Cursor, FetchError, FetchResult, Page, RemoteSource, StatisticsResponse};

/// 2024-01-07 00:00:00 UTC, a Sunday
pub const WEEK: i64 = 1_704_585_600;

pub type PageScript<T> = Vec<FetchResult<Vec<T>>>;

/// Remote source whose every answer is set up by the test
///
/// Listings are scripted page by page; the cursor of page `n` is `"n"`.
/// Statistics answers are consumed in order per repository, and the last
/// answer repeats once the queue runs dry.
pub struct ScriptedSource {
    user: GroupInfo,
    groups: Mutex<PageScript<GroupInfo>>,
    starred: Mutex<PageScript<String>>,
    repositories: Mutex<HashMap<String, PageScript<RepositoryInfo>>>,
    statistics: Mutex<HashMap<String, VecDeque<FetchResult<StatisticsResponse>>>>,
    statistics_gate: Mutex<Option<Arc<Semaphore>>>,
    repositories_gate: Mutex<Option<Arc<Semaphore>>>,
    repository_requests: AtomicUsize,
    page_requests: AtomicUsize,
    statistics_requests: AtomicUsize,
}

pub fn group(id: u64, name: &str) -> GroupInfo {
    GroupInfo {
        id: GroupId(id),
        name: name.to_string(),
        avatar_url: None,
    }
}

pub fn repo(id: u64, owner: &str, name: &str) -> RepositoryInfo {
    RepositoryInfo {
        id: RepositoryId(id),
        name: name.to_string(),
        full_name: format!("{}/{}", owner, name),
        url: format!("https://example.invalid/{}/{}", owner, name),
    }
}

pub fn week(login: &str, offset_weeks: i64, additions: u64, deletions: u64, commits: u64) -> WeeklyContribution {
    WeeklyContribution {
        login: login.to_string(),
        week_timestamp: WEEK + offset_weeks * 7 * 24 * 3600,
        additions,
        deletions,
        commits,
    }
}

pub fn ready(weeks: Vec<WeeklyContribution>) -> FetchResult<StatisticsResponse> {
    Ok(StatisticsResponse::Ready(weeks))
}

impl ScriptedSource {
    pub fn new(user: &str) -> Self {
        Self {
            user: group(0, user),
            groups: Mutex::new(vec![Ok(Vec::new())]),
            starred: Mutex::new(vec![Ok(Vec::new())]),
            repositories: Mutex::new(HashMap::new()),
            statistics: Mutex::new(HashMap::new()),
            statistics_gate: Mutex::new(None),
            repositories_gate: Mutex::new(None),
            repository_requests: AtomicUsize::new(0),
            page_requests: AtomicUsize::new(0),
            statistics_requests: AtomicUsize::new(0),
        }
    }

    pub fn user(&self) -> &GroupInfo {
        &self.user
    }

    pub fn script_groups(&self, pages: PageScript<GroupInfo>) {
        *self.groups.lock() = pages;
    }

    pub fn script_starred(&self, pages: PageScript<String>) {
        *self.starred.lock() = pages;
    }

    pub fn script_repositories(&self, owner: &str, pages: PageScript<RepositoryInfo>) {
        self.repositories.lock().insert(owner.to_string(), pages);
    }

    pub fn script_statistics(&self, full_name: &str, answers: Vec<FetchResult<StatisticsResponse>>) {
        self.statistics
            .lock()
            .insert(full_name.to_string(), answers.into_iter().collect());
    }

    /// Hold statistics answers until permits are added to the returned gate
    pub fn gate_statistics(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.statistics_gate.lock() = Some(gate.clone());
        gate
    }

    /// Hold repository pages until permits are added to the returned gate
    pub fn gate_repositories(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.repositories_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn repository_requests(&self) -> usize {
        self.repository_requests.load(Ordering::SeqCst)
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn statistics_requests(&self) -> usize {
        self.statistics_requests.load(Ordering::SeqCst)
    }

    fn page<T: Clone>(&self, operation: &str, pages: &PageScript<T>, cursor: Option<Cursor>) -> FetchResult<Page<T>> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let index = match cursor {
            None => 0,
            Some(cursor) => cursor
                .as_str()
                .parse::<usize>()
                .map_err(|_| FetchError::malformed(operation, format!("bad cursor {}", cursor)))?,
        };
        let items = pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::malformed(operation, "no such page")))?;
        if index + 1 < pages.len() {
            Ok(Page::with_next(items, Cursor::new((index + 1).to_string())))
        } else {
            Ok(Page::last(items))
        }
    }
}

#[async_trait]
impl RemoteSource for ScriptedSource {
    async fn authenticated_user(&self) -> FetchResult<GroupInfo> {
        Ok(self.user.clone())
    }

    async fn list_groups_page(&self, cursor: Option<Cursor>) -> FetchResult<Page<GroupInfo>> {
        let pages = self.groups.lock().clone();
        self.page("list groups", &pages, cursor)
    }

    async fn list_starred_page(&self, cursor: Option<Cursor>) -> FetchResult<Page<String>> {
        let pages = self.starred.lock().clone();
        self.page("list starred", &pages, cursor)
    }

    async fn list_repositories_page(&self, owner: &str, cursor: Option<Cursor>) -> FetchResult<Page<RepositoryInfo>> {
        self.repository_requests.fetch_add(1, Ordering::SeqCst);
        let gate = self.repositories_gate.lock().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let pages = self
            .repositories
            .lock()
            .get(owner)
            .cloned()
            .unwrap_or_else(|| vec![Ok(Vec::new())]);
        self.page("list repositories", &pages, cursor)
    }

    async fn contributor_statistics(&self, full_name: &str) -> FetchResult<StatisticsResponse> {
        self.statistics_requests.fetch_add(1, Ordering::SeqCst);
        let answer = {
            let mut statistics = self.statistics.lock();
            match statistics.get_mut(full_name) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let gate = self.statistics_gate.lock().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        answer.unwrap_or_else(|| Ok(StatisticsResponse::Ready(Vec::new())))
    }
}
