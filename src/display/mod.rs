//! Terminal presentation helpers
//!
//! Colour roles for report text and compact one-line rendering of rollups.

pub mod colours;
pub mod config;
pub mod format;

pub use colours::*;
pub use config::*;
pub use format::*;
