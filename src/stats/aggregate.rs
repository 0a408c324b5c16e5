//! Additions/deletions/commits accumulator
//!
//! `Aggregate` is the unit of all rollup math. Combination is field-wise
//! addition with the all-zero value as identity, so rollups may be computed
//! in any traversal order.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use serde::{Deserialize, Serialize};

/// One of the three tracked contribution metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Additions,
    Deletions,
    Commits,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; 3] = [Metric::Additions, Metric::Deletions, Metric::Commits];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Additions => "additions",
            Metric::Deletions => "deletions",
            Metric::Commits => "commits",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "additions" | "a" => Ok(Metric::Additions),
            "deletions" | "d" => Ok(Metric::Deletions),
            "commits" | "c" => Ok(Metric::Commits),
            _ => Err(format!("Invalid metric: {}. Valid options: additions, deletions, commits", s)),
        }
    }
}

/// Field-wise additive triple of contribution counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub additions: u64,
    pub deletions: u64,
    pub commits: u64,
}

impl Aggregate {
    /// The identity element
    pub const ZERO: Aggregate = Aggregate { additions: 0, deletions: 0, commits: 0 };

    pub fn new(additions: u64, deletions: u64, commits: u64) -> Self {
        Self { additions, deletions, commits }
    }

    /// Combine another aggregate into this one
    pub fn combine(&mut self, other: &Aggregate) {
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.commits += other.commits;
    }

    /// Read a single metric
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Additions => self.additions,
            Metric::Deletions => self.deletions,
            Metric::Commits => self.commits,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Net line change (additions minus deletions)
    pub fn net_change(&self) -> i128 {
        i128::from(self.additions) - i128::from(self.deletions)
    }
}

impl Add for Aggregate {
    type Output = Aggregate;

    fn add(mut self, rhs: Aggregate) -> Aggregate {
        self.combine(&rhs);
        self
    }
}

impl AddAssign for Aggregate {
    fn add_assign(&mut self, rhs: Aggregate) {
        self.combine(&rhs);
    }
}

impl<'a> AddAssign<&'a Aggregate> for Aggregate {
    fn add_assign(&mut self, rhs: &'a Aggregate) {
        self.combine(rhs);
    }
}

impl Sum for Aggregate {
    fn sum<I: Iterator<Item = Aggregate>>(iter: I) -> Self {
        iter.fold(Aggregate::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Aggregate> for Aggregate {
    fn sum<I: Iterator<Item = &'a Aggregate>>(iter: I) -> Self {
        iter.fold(Aggregate::ZERO, |acc, a| acc + *a)
    }
}
