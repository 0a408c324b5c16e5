//! Contribution statistics dashboard engine
//!
//! A three-level tree (dashboard, groups, repositories) whose contributor
//! statistics are fetched lazily from a [`remote::RemoteSource`] and rolled
//! up into per-node summaries. A starred-only filter narrows the matched
//! rollups without touching the unfiltered ones.

pub mod stats;
pub mod model;
pub mod filter;
pub mod remote;
pub mod orchestrator;
pub mod notifications;
pub mod config;
pub mod logging;
pub mod display;
pub mod output;
pub mod cli;
pub mod app;
