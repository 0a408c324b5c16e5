//! Statistics rollup module
//!
//! Provides the additive contribution counters and the per-scope summaries
//! that are rolled up from repositories to groups to the dashboard.

pub mod aggregate;
pub mod summary;

pub use aggregate::{Aggregate, Metric};
pub use summary::ContributionSummary;
