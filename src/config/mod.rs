//! Configuration module for imagediff.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//!
//! # Configuration File
//!
//! Place a `.imagediff.yaml` file in your working directory or
//! `~/.config/imagediff/`:
//!
//! ```yaml
//! execution:
//!   parallel: true
//!   worker_multiplier: 2
//! output:
//!   max_value_len: 100
//! strategies:
//!   comparators: [metadata, pixel]
//!   params:
//!     pixel.bitDepth: '1'
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{worker_count, DEFAULT_MAX_VALUE_LEN, DEFAULT_WORKER_MULTIPLIER};
pub use types::{
    AppConfig, CorrespondenceConfig, DiffConfig, DiffPaths, ExecutionConfig, ExtractConfig,
    OutputConfig, StrategyConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    default_config_path, discover_config_file, generate_example_config, load_config,
    load_config_file, load_or_default, ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// The schema documents every option of `.imagediff.yaml` and can be used
/// by editors for validation and autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
