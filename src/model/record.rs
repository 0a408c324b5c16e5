//! Weekly contribution records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::Aggregate;

/// A week row whose timestamp cannot be represented as an instant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid week timestamp {week_timestamp} for contributor '{login}'")]
pub struct InvalidWeek {
    pub login: String,
    pub week_timestamp: i64,
}

/// One contributor's activity in one week of one repository
///
/// Records are immutable once created. Weeks without commits are dropped
/// before a record is ever built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    login: String,
    timestamp: DateTime<Utc>,
    additions: u64,
    deletions: u64,
    commits: u64,
}

impl ContributionRecord {
    pub fn new(
        login: impl Into<String>,
        timestamp: DateTime<Utc>,
        additions: u64,
        deletions: u64,
        commits: u64,
    ) -> Self {
        Self {
            login: login.into(),
            timestamp,
            additions,
            deletions,
            commits,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn additions(&self) -> u64 {
        self.additions
    }

    pub fn deletions(&self) -> u64 {
        self.deletions
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// The record's counts as an aggregate
    pub fn aggregate(&self) -> Aggregate {
        Aggregate::new(self.additions, self.deletions, self.commits)
    }
}

/// Raw weekly row as delivered by a statistics response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyContribution {
    pub login: String,
    /// Start of the week in seconds since the Unix epoch
    pub week_timestamp: i64,
    pub additions: u64,
    pub deletions: u64,
    pub commits: u64,
}

impl WeeklyContribution {
    /// Convert to a record; weeks without commits yield `None`
    pub fn into_record(self) -> Result<Option<ContributionRecord>, InvalidWeek> {
        if self.commits == 0 {
            return Ok(None);
        }
        let timestamp = DateTime::<Utc>::from_timestamp(self.week_timestamp, 0).ok_or_else(|| InvalidWeek {
            login: self.login.clone(),
            week_timestamp: self.week_timestamp,
        })?;
        Ok(Some(ContributionRecord::new(
            self.login,
            timestamp,
            self.additions,
            self.deletions,
            self.commits,
        )))
    }
}

/// Materialize the records of a statistics response, dropping idle weeks
pub fn from_weeks<I>(weeks: I) -> Result<Vec<ContributionRecord>, InvalidWeek>
where
    I: IntoIterator<Item = WeeklyContribution>,
{
    let mut records = Vec::new();
    for week in weeks {
        if let Some(record) = week.into_record()? {
            records.push(record);
        }
    }
    Ok(records)
}
