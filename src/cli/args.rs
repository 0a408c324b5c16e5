use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};

use crate::display::OutputFormat;
use crate::remote::SyntheticConfig;
use crate::stats::Metric;

/// Contribution statistics dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "contribstats")]
#[command(about = "Lazily fetched organisation, repository and contributor rollups with a starred-only view")]
#[command(version)]
pub struct Args {
    /// Only count repositories the user has starred
    #[arg(short = 's', long)]
    pub starred_only: bool,

    /// Number of organisations the synthetic source provides
    #[arg(long, value_name = "N")]
    pub groups: Option<usize>,

    /// Repositories per group
    #[arg(long, value_name = "N")]
    pub repositories: Option<usize>,

    /// Weeks of statistics per contributor
    #[arg(long, value_name = "N")]
    pub weeks: Option<usize>,

    /// Contributors per repository
    #[arg(long, value_name = "N")]
    pub contributors: Option<usize>,

    /// Items per listing page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Seed for generated statistics
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Number of top contributors to list
    #[arg(short = 't', long, value_name = "N", default_value_t = 5)]
    pub top: usize,

    /// Metric used to rank contributors: additions, deletions or commits
    #[arg(long, value_name = "METRIC", default_value = "commits")]
    pub rank_by: String,

    /// One line per group instead of tables
    #[arg(short = 'c', long)]
    pub compact: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,
}

impl Args {
    pub fn output_format(&self) -> OutputFormat {
        if self.compact {
            OutputFormat::Compact
        } else {
            OutputFormat::Standard
        }
    }

    /// Ranking metric; `validate_args` has already vetted the text
    pub fn rank_metric(&self) -> Result<Metric> {
        self.rank_by.parse::<Metric>().map_err(|e| anyhow::anyhow!(e))
    }

    /// Command-line values take precedence over configured ones
    pub fn apply_to_synthetic(&self, mut config: SyntheticConfig) -> SyntheticConfig {
        if let Some(groups) = self.groups {
            config.groups = groups;
        }
        if let Some(repositories) = self.repositories {
            config.repositories = repositories;
        }
        if let Some(weeks) = self.weeks {
            config.weeks = weeks;
        }
        if let Some(contributors) = self.contributors {
            config.contributors = contributors;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if args.page_size == Some(0) {
        return Err(anyhow::anyhow!("--page-size must be at least 1"));
    }

    args.rank_metric()?;

    info!("CLI arguments validated successfully");
    Ok(())
}
