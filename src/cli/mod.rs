//! Command-line argument parsing and validation

pub mod args;

pub use args::{parse_args, validate_args, Args};
