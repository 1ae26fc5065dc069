//! **Cover/stego image comparison and payload extraction.**
//!
//! `imagediff` compares pairs of images (a *cover* and a *stego* variant)
//! with pluggable comparison strategies and aggregates what they find into
//! one structured JSON report. A second pipeline extracts raw payload bytes
//! from single images with pluggable extractors.
//!
//! ## Core Concepts & Modules
//!
//! - **[`correspondence`]**: resolves the ordered list of (cover, stego)
//!   pairs, either from a filtered CSV correspondence table or by zipping
//!   two directory listings.
//! - **[`strategies`]**: the comparators (`metadata`, `pixel`, `composite`)
//!   and extractors (`lsb`), their parameters and the [`StrategyRegistry`].
//! - **[`engine`]**: runs the selected strategies over every pair or image,
//!   sequentially or on a bounded worker pool, isolating per-item failures.
//! - **[`model`]**: the diff tree ([`DiffResult`]), the merge operation,
//!   statistics and the persisted [`DiffData`] document.
//! - **[`reports`]**: truncation of overlong values and JSON rendering of
//!   combined or per-pair reports.
//! - **[`pipeline`]**: the resolve → execute → report stages used by the CLI.
//!
//! ## Comparing two images
//!
//! ```no_run
//! use imagediff::config::ExecutionConfig;
//! use imagediff::model::ImagePair;
//! use imagediff::reports::{build_report, JsonReporter, Normalizer};
//! use imagediff::{ComparisonExecutor, StrategyRegistry};
//! use std::collections::BTreeMap;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let comparators = StrategyRegistry::new()
//!         .resolve_comparators(&["metadata".to_string()], &BTreeMap::new())?;
//!     let pairs = vec![ImagePair::new(0, "cover.jpg", "stego.jpg")];
//!
//!     let outcome = ComparisonExecutor::new(comparators, ExecutionConfig::sequential())
//!         .execute(&pairs)?;
//!     let report = build_report(&outcome.results, Normalizer::new(Some(100)));
//!
//!     println!("{}", JsonReporter::new().render(&report)?);
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Pixel math and rate computation cast between integer widths and f64;
    // all values are bounded by image dimensions and result counts
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod config;
pub mod correspondence;
pub mod engine;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod strategies;

// Re-export main types for convenience
pub use config::{AppConfig, DiffConfig, ExecutionConfig, ExtractConfig, OutputConfig};
pub use config::{ConfigError, Validatable};
pub use correspondence::{resolve_pairs, resolve_stego_images, CorrespondenceTable, Filters};
pub use engine::{ComparisonExecutor, ExecutionOutcome, ExtractionExecutor, ExtractionOutcome};
pub use error::{ErrorContext, ImageDiffError, Result};
pub use model::{merge, DiffData, DiffField, DiffKey, DiffResult, DiffValue, Image, ImagePair};
pub use model::{ExtractedData, Statistics};
pub use reports::{JsonReporter, Normalizer};
pub use strategies::{Comparator, Extractor, StrategyError, StrategyRegistry};
