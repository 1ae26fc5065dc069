//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod diff;
mod extract;
mod strategies;

pub use diff::run_diff;
pub use extract::run_extract;
pub use strategies::{render_strategies, run_strategies};

// Re-export config types used by handlers
pub use crate::config::{DiffConfig, ExtractConfig};
