//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    load_configuration,
    configure_logging,
    create_colour_manager,
};
pub use execution::{
    load_contributions,
    load_repositories,
    populate_dashboard,
    run_dashboard,
    FetchTally,
};
