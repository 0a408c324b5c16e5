//! Ordered contribution storage for a single repository

use std::cmp::Ordering;

use super::record::ContributionRecord;

/// Display order: most recent week first, then login ascending
pub fn display_order(a: &ContributionRecord, b: &ContributionRecord) -> Ordering {
    b.timestamp()
        .cmp(&a.timestamp())
        .then_with(|| a.login().cmp(b.login()))
}

/// The contribution records of one repository, kept in display order
///
/// Bulk replacement is the only insert path. Duplicate (login, week) pairs
/// are not rejected; the latest full replace is authoritative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionStore {
    records: Vec<ContributionRecord>,
}

impl ContributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a complete new set of records and sort them
    pub fn replace_all(&mut self, mut records: Vec<ContributionRecord>) {
        records.sort_by(display_order);
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Read-only view in display order
    pub fn to_ordered_sequence(&self) -> &[ContributionRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContributionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
