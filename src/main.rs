use anyhow::Result;
use log::error;
use std::process;

use contribstats::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();
    cli::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let colour_manager = app::create_colour_manager(&args, &config_manager);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_dashboard(&args, &config_manager, &colour_manager))
}
