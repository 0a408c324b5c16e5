//! Per-scope contribution rollups
//!
//! A `ContributionSummary` holds a total plus a per-login breakdown. Rankings
//! are not maintained while absorbing; `finalize_ranking` rebuilds all three
//! orderings in one pass and must be called before `ranking` is read.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use super::aggregate::{Aggregate, Metric};
use crate::model::ContributionRecord;

/// Rollup of contributions for a repository, group or the whole dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionSummary {
    total: Aggregate,
    by_login: BTreeMap<String, Aggregate>,
    ranking: BTreeMap<Metric, Vec<String>>,
}

impl ContributionSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a finalized summary from an iterator of records
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ContributionRecord>,
    {
        let mut summary = Self::new();
        for record in records {
            summary.absorb_record(record);
        }
        summary.finalize_ranking();
        summary
    }

    /// Build a finalized summary from child summaries
    pub fn from_summaries<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a ContributionSummary>,
    {
        let mut summary = Self::new();
        for child in summaries {
            summary.absorb_summary(child);
        }
        summary.finalize_ranking();
        summary
    }

    /// Get the accumulator for a login, inserting a zero entry if absent
    pub fn by_login_entry(&mut self, login: &str) -> &mut Aggregate {
        self.by_login.entry(login.to_string()).or_insert(Aggregate::ZERO)
    }

    /// Add a single record to the total and to its login's entry
    pub fn absorb_record(&mut self, record: &ContributionRecord) {
        let counts = record.aggregate();
        self.total += counts;
        *self.by_login_entry(record.login()) += counts;
    }

    /// Merge another summary's total and per-login entries into this one
    pub fn absorb_summary(&mut self, other: &ContributionSummary) {
        self.total += other.total;
        for (login, counts) in &other.by_login {
            *self.by_login_entry(login) += counts;
        }
    }

    /// Rebuild the per-metric login orderings
    ///
    /// Each ordering lists every login in `by_login`, highest value first,
    /// ties broken by login ascending.
    pub fn finalize_ranking(&mut self) {
        self.ranking.clear();
        for metric in Metric::ALL {
            let mut logins: Vec<(&String, u64)> = self
                .by_login
                .iter()
                .map(|(login, counts)| (login, counts.get(metric)))
                .collect();
            logins.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            self.ranking
                .insert(metric, logins.into_iter().map(|(login, _)| login.clone()).collect());
        }
    }

    pub fn total(&self) -> Aggregate {
        self.total
    }

    pub fn by_login(&self) -> &BTreeMap<String, Aggregate> {
        &self.by_login
    }

    /// Counts for a single login, if it contributed
    pub fn login(&self, login: &str) -> Option<Aggregate> {
        self.by_login.get(login).copied()
    }

    /// Ordered logins for a metric (empty until `finalize_ranking` runs)
    pub fn ranking(&self, metric: Metric) -> &[String] {
        self.ranking.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first `n` logins of a ranking together with their counts
    pub fn top(&self, metric: Metric, n: usize) -> Vec<(String, Aggregate)> {
        self.ranking(metric)
            .iter()
            .take(n)
            .map(|login| (login.clone(), self.by_login.get(login).copied().unwrap_or_default()))
            .collect()
    }

    pub fn contributor_count(&self) -> usize {
        self.by_login.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_login.is_empty() && self.total.is_zero()
    }
}
