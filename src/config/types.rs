//! Configuration types for imagediff operations.
//!
//! [`AppConfig`] is what a config file holds. [`DiffConfig`] and
//! [`ExtractConfig`] are assembled per command from the file config and the
//! command line, with the command line taking precedence.

use super::defaults::{worker_count, DEFAULT_MAX_VALUE_LEN, DEFAULT_WORKER_MULTIPLIER};
use crate::correspondence::Filters;
use crate::strategies::StrategyRegistry;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// How comparisons and extractions are scheduled
    pub execution: ExecutionConfig,
    /// Report rendering
    pub output: OutputConfig,
    /// Default strategy selection and parameters
    pub strategies: StrategyConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Execution scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Process pairs on a worker pool instead of one after another
    pub parallel: bool,
    /// Worker threads per available CPU
    #[schemars(range(min = 1))]
    pub worker_multiplier: usize,
    /// Upper bound on worker threads
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub max_workers: Option<usize>,
    /// Per-task time budget in seconds; checked between strategy calls
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub task_deadline_secs: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            worker_multiplier: DEFAULT_WORKER_MULTIPLIER,
            max_workers: None,
            task_deadline_secs: None,
        }
    }
}

impl ExecutionConfig {
    /// Sequential execution with default pool settings.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Parallel execution with default pool settings.
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }

    /// Number of worker threads used in parallel mode.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        worker_count(self.worker_multiplier, self.max_workers)
    }

    #[must_use]
    pub fn task_deadline(&self) -> Option<Duration> {
        self.task_deadline_secs.map(Duration::from_secs)
    }
}

/// Report rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Maximum length of string values in reports; 0 disables truncation
    pub max_value_len: usize,
    /// Truncate overlong string values
    pub truncate: bool,
    /// Pretty-print JSON documents
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_value_len: DEFAULT_MAX_VALUE_LEN,
            truncate: true,
            pretty: true,
        }
    }
}

impl OutputConfig {
    /// Truncation limit, or `None` if truncation is off.
    #[must_use]
    pub const fn truncation_limit(&self) -> Option<usize> {
        if self.truncate && self.max_value_len > 0 {
            Some(self.max_value_len)
        } else {
            None
        }
    }
}

/// Strategy defaults applied when the command line selects none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StrategyConfig {
    /// Comparators to run; empty means all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comparators: Vec<String>,
    /// Extractors to run; empty means all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extractors: Vec<String>,
    /// `strategy.param` → value
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl StrategyConfig {
    /// Default params addressed to a registered comparator.
    #[must_use]
    pub fn comparator_params(&self) -> BTreeMap<String, String> {
        let registry = StrategyRegistry::new();
        self.params_where(|strategy| registry.comparator(strategy).is_ok())
    }

    /// Default params addressed to a registered extractor.
    #[must_use]
    pub fn extractor_params(&self) -> BTreeMap<String, String> {
        let registry = StrategyRegistry::new();
        self.params_where(|strategy| registry.extractor(strategy).is_ok())
    }

    fn params_where(&self, keep: impl Fn(&str) -> bool) -> BTreeMap<String, String> {
        self.params
            .iter()
            .filter(|(key, _)| key.split_once('.').is_some_and(|(strategy, _)| keep(strategy)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

// ============================================================================
// Command-specific Configuration Types
// ============================================================================

/// Table-driven pairing options.
#[derive(Debug, Clone, Default)]
pub struct CorrespondenceConfig {
    /// CSV correspondence table
    pub table: Option<PathBuf>,
    /// Row filters applied to the table
    pub filters: Filters,
}

/// Paths for diff operation
#[derive(Debug, Clone)]
pub struct DiffPaths {
    /// Cover image file or directory
    pub cover: PathBuf,
    /// Stego image file or directory
    pub stego: PathBuf,
}

/// Configuration for diff operations
#[derive(Debug, Clone)]
pub struct DiffConfig {
    pub paths: DiffPaths,
    pub correspondence: CorrespondenceConfig,
    /// Report file, or directory in split mode; `None` writes to stdout
    pub output_path: Option<PathBuf>,
    /// One report document per pair
    pub split: bool,
    /// Comparator names; empty means all
    pub comparators: Vec<String>,
    /// `comparator.param` → value
    pub params: BTreeMap<String, String>,
    pub execution: ExecutionConfig,
    pub output: OutputConfig,
    /// Exit non-zero when any comparison failed
    pub fail_on_error: bool,
}

/// Configuration for extract operations
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Stego image file or directory
    pub stego: PathBuf,
    pub correspondence: CorrespondenceConfig,
    /// Directory receiving the extracted payloads
    pub output_dir: PathBuf,
    /// Extractor names; empty means all
    pub extractors: Vec<String>,
    /// `extractor.param` → value
    pub params: BTreeMap<String, String>,
    pub execution: ExecutionConfig,
    pub fail_on_error: bool,
}
