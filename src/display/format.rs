//! Output modes and one-line formatting of rollups
//!
//! The compact form is a single line per node, suitable for piping into
//! other tools.

use std::str::FromStr;

use crate::stats::{Aggregate, ContributionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tables per section
    #[default]
    Standard,
    /// One line per group
    Compact,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "table" => Ok(OutputFormat::Standard),
            "compact" => Ok(OutputFormat::Compact),
            _ => Err(format!("Invalid output format: {}. Valid options: standard, compact", s)),
        }
    }
}

/// Types that render as a single line
pub trait CompactFormat {
    /// Never contains a newline
    fn to_compact_format(&self) -> String;
}

/// Group digits in threes: 1234567 -> "1,234,567"
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Collapse line breaks so a name cannot split a compact line
pub fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

impl CompactFormat for Aggregate {
    fn to_compact_format(&self) -> String {
        format!(
            "+{} -{} {} commits",
            format_count(self.additions),
            format_count(self.deletions),
            format_count(self.commits)
        )
    }
}

impl CompactFormat for ContributionSummary {
    fn to_compact_format(&self) -> String {
        let count = self.contributor_count();
        format!(
            "{}, {} contributor{}",
            self.total().to_compact_format(),
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}
