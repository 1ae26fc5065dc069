//! Report generation.
//!
//! Diff results become a [`DiffData`] document: statistics computed over the
//! complete result set and results passed through the [`Normalizer`]. Both
//! are derived side by side. A report is written either as one document or
//! split into one document per pair.

mod extraction;
mod json;
mod normalize;

pub use extraction::{
    payload_file_name, write_payloads, ExtractionManifest, ManifestEntry, MANIFEST_FILE_NAME,
};
pub use json::JsonReporter;
pub use normalize::{truncate_str, truncate_value, Normalizer, ELLIPSIS};

use crate::model::{DiffData, DiffResult, Statistics};
use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Build the combined report for `results`.
#[must_use]
pub fn build_report(results: &[DiffResult], normalizer: Normalizer) -> DiffData {
    let (statistics, normalized) = rayon::join(
        || Statistics::compute(results),
        || normalizer.normalize(results),
    );
    DiffData::new(statistics, normalized)
}

/// Build one report per result, keyed by its output file name.
///
/// Each document carries only its own result and that result's statistics.
#[must_use]
pub fn build_split_reports(
    results: &[DiffResult],
    normalizer: Normalizer,
) -> Vec<(String, DiffData)> {
    results
        .par_iter()
        .map(|result| {
            (
                result.output_file_name(),
                build_report(std::slice::from_ref(result), normalizer),
            )
        })
        .collect()
}
