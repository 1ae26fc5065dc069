//! Persisted report document.

use super::diff::DiffResult;
use super::statistics::Statistics;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Report format version written to every document.
pub const REPORT_VERSION: &str = "1.0";

/// The persisted diff report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffData {
    pub version: String,
    /// Generation time in epoch milliseconds
    pub timestamp: i64,
    pub statistics: Statistics,
    pub results: Vec<DiffResult>,
}

impl DiffData {
    /// Build a report stamped with the current time.
    #[must_use]
    pub fn new(statistics: Statistics, results: Vec<DiffResult>) -> Self {
        Self {
            version: REPORT_VERSION.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            statistics,
            results,
        }
    }

    /// Build a report from `results`, computing statistics over them.
    #[must_use]
    pub fn from_results(results: Vec<DiffResult>) -> Self {
        let statistics = Statistics::compute(&results);
        Self::new(statistics, results)
    }
}
