//! Fetch Orchestrator
//!
//! Translates (re)load intents into remote calls and lands the results in
//! the contribution tree, tracking per-node fetch state.

pub mod engine;
pub mod error;

pub use engine::{starred_names_for, FetchOrchestrator, ListingOutcome};
pub use error::{EngineError, EngineResult};
