//! Report rendering for the command-line dashboard

pub mod reports;

pub use reports::{
    contributor_rows,
    display_dashboard_report,
    format_compact_table,
    group_rows,
    matched_total,
    visible_rollup,
    render_compact_report,
    render_report,
    render_standard_report,
    repository_rows,
    ReportOptions,
};
