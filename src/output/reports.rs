//! Dashboard report generation and formatting

use prettytable::{format, Cell, Row, Table};

use crate::display::{format_count, single_line, ColourManager, CompactFormat, OutputFormat};
use crate::filter::FilterPredicate;
use crate::model::{Dashboard, GroupNode};
use crate::stats::{ContributionSummary, Metric};

const GROUP_HEADERS: [&str; 7] = ["Group", "Repos", "Listing", "Additions", "Deletions", "Commits", "Contributors"];
const REPOSITORY_HEADERS: [&str; 7] = ["Repository", "Starred", "State", "Additions", "Deletions", "Commits", "Top contributor"];
const CONTRIBUTOR_HEADERS: [&str; 5] = ["#", "Contributor", "Additions", "Deletions", "Commits"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub format: OutputFormat,
    /// Contributors listed under the grand total
    pub top: usize,
    /// Metric the contributor ranking uses
    pub rank_by: Metric,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Standard,
            top: 5,
            rank_by: Metric::Commits,
        }
    }
}

/// Format a compact table with headers and rows using prettytable-rs clean format
pub fn format_compact_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(Row::new(headers.iter().map(|header| Cell::new(header)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
    }

    let mut result = String::new();
    for line in table.to_string().lines() {
        result.push_str("  ");
        result.push_str(line);
        result.push('\n');
    }
    result
}

/// Rollup of the repositories of `group` the filter currently shows
pub fn visible_rollup(group: &GroupNode, filter: &FilterPredicate) -> ContributionSummary {
    if filter.starred_only() {
        ContributionSummary::from_summaries(group.visible_repositories(filter).map(|repo| repo.matched_summary()))
    } else {
        group.matched_summary().clone()
    }
}

/// The rollup the report totals: every group when unfiltered, else the visible share
pub fn matched_total(dashboard: &Dashboard) -> ContributionSummary {
    let filter = *dashboard.filter();
    if filter.starred_only() {
        let rollups: Vec<ContributionSummary> = dashboard
            .visible_groups()
            .map(|group| visible_rollup(group, &filter))
            .collect();
        ContributionSummary::from_summaries(rollups.iter())
    } else {
        dashboard.summary().clone()
    }
}

pub fn group_rows(dashboard: &Dashboard) -> Vec<Vec<String>> {
    let filter = *dashboard.filter();
    dashboard
        .visible_groups()
        .map(|group| {
            let rollup = visible_rollup(group, &filter);
            let total = rollup.total();
            vec![
                group.name().to_string(),
                format!("{}/{}", group.visible_repositories(&filter).count(), group.repositories().len()),
                group.fetch_state().to_string(),
                format_count(total.additions),
                format_count(total.deletions),
                format_count(total.commits),
                rollup.contributor_count().to_string(),
            ]
        })
        .collect()
}

pub fn repository_rows(dashboard: &Dashboard, rank_by: Metric) -> Vec<Vec<String>> {
    let filter = *dashboard.filter();
    let mut rows = Vec::new();
    for group in dashboard.visible_groups() {
        for repo in group.visible_repositories(&filter) {
            let total = repo.summary().total();
            let top = repo
                .summary()
                .top(rank_by, 1)
                .into_iter()
                .next()
                .map(|(login, aggregate)| format!("{} ({})", login, format_count(aggregate.get(rank_by))))
                .unwrap_or_default();
            rows.push(vec![
                repo.full_name().to_string(),
                if repo.is_starred() { "*".to_string() } else { String::new() },
                repo.fetch_state().to_string(),
                format_count(total.additions),
                format_count(total.deletions),
                format_count(total.commits),
                top,
            ]);
        }
    }
    rows
}

pub fn contributor_rows(summary: &ContributionSummary, rank_by: Metric, top: usize) -> Vec<Vec<String>> {
    summary
        .top(rank_by, top)
        .into_iter()
        .enumerate()
        .map(|(rank, (login, aggregate))| {
            vec![
                (rank + 1).to_string(),
                login,
                format_count(aggregate.additions),
                format_count(aggregate.deletions),
                format_count(aggregate.commits),
            ]
        })
        .collect()
}

/// Group, repository and grand-total sections
pub fn render_standard_report(dashboard: &Dashboard, options: &ReportOptions, colours: &ColourManager) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", colours.heading("Groups")));
    let groups = format_compact_table(&GROUP_HEADERS, &group_rows(dashboard));
    if groups.is_empty() {
        out.push_str(&format!("  {}\n", colours.muted("no groups to show")));
    } else {
        out.push_str(&groups);
    }

    out.push_str(&format!("\n{}\n", colours.heading("Repositories")));
    let repositories = format_compact_table(&REPOSITORY_HEADERS, &repository_rows(dashboard, options.rank_by));
    if repositories.is_empty() {
        out.push_str(&format!("  {}\n", colours.muted("no repositories to show")));
    } else {
        out.push_str(&repositories);
    }

    let total = matched_total(dashboard);
    let heading = if dashboard.filter().starred_only() {
        "Total (starred only)"
    } else {
        "Total"
    };
    out.push_str(&format!(
        "\n{} {}  net {}\n",
        colours.heading(heading),
        total.to_compact_format(),
        colours.net_change(total.total().net_change())
    ));

    if options.top > 0 {
        let contributors = format_compact_table(&CONTRIBUTOR_HEADERS, &contributor_rows(&total, options.rank_by, options.top));
        if !contributors.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                colours.heading(&format!("Top contributors by {}", options.rank_by))
            ));
            out.push_str(&contributors);
        }
    }
    out
}

/// One line per visible group followed by the total line
pub fn render_compact_report(dashboard: &Dashboard) -> String {
    let filter = *dashboard.filter();
    let mut out = String::new();
    for group in dashboard.visible_groups() {
        out.push_str(&format!(
            "{}: {}/{} repos [{}] {}\n",
            single_line(group.name()),
            group.visible_repositories(&filter).count(),
            group.repositories().len(),
            group.fetch_state(),
            visible_rollup(group, &filter).to_compact_format()
        ));
    }
    out.push_str(&format!("total: {}\n", matched_total(dashboard).to_compact_format()));
    out
}

pub fn render_report(dashboard: &Dashboard, options: &ReportOptions, colours: &ColourManager) -> String {
    match options.format {
        OutputFormat::Standard => render_standard_report(dashboard, options, colours),
        OutputFormat::Compact => render_compact_report(dashboard),
    }
}

pub fn display_dashboard_report(dashboard: &Dashboard, options: &ReportOptions, colours: &ColourManager) {
    print!("{}", render_report(dashboard, options, colours));
}
