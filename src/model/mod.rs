//! Core data model: image handles, diff trees, statistics and reports.

mod diff;
mod handle;
mod report;
mod statistics;

pub use diff::{
    merge, pair_id, report_file_name, ComparatorDiff, ComparatorName, Diff, DiffField, DiffKey, DiffResult,
    DiffValue,
};
pub use handle::{file_extension, file_stem, DecodedImage, Image, ImageLoadError};
pub use report::{DiffData, REPORT_VERSION};
pub use statistics::Statistics;

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A (cover, stego) pair in resolver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    /// Position in the resolver's output
    pub index: usize,
    pub cover: PathBuf,
    pub stego: PathBuf,
}

impl ImagePair {
    pub fn new(index: usize, cover: impl Into<PathBuf>, stego: impl Into<PathBuf>) -> Self {
        Self {
            index,
            cover: cover.into(),
            stego: stego.into(),
        }
    }

    /// Result id of this pair.
    #[must_use]
    pub fn id(&self) -> String {
        pair_id(&self.cover, &self.stego)
    }

    /// File name of this pair's report in split mode.
    #[must_use]
    pub fn report_file_name(&self) -> String {
        report_file_name(&self.cover, &self.stego)
    }
}

/// Extractor name → extracted payload for one image.
pub type ExtractedData = BTreeMap<String, Vec<u8>>;
