//! Extraction output: payload files plus a manifest.

use super::ReportError;
use crate::engine::ExtractedImage;
use crate::model::REPORT_VERSION;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the manifest written next to the payload files.
pub const MANIFEST_FILE_NAME: &str = "extracted.json";

/// Which payload files were written for which image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionManifest {
    pub version: String,
    /// Generation time in epoch milliseconds
    pub timestamp: i64,
    pub images: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub image: PathBuf,
    /// extractor → written payload file
    pub files: BTreeMap<String, PathBuf>,
}

/// File name of one payload: `<image stem>_<extractor>.bin`.
#[must_use]
pub fn payload_file_name(image: &Path, extractor: &str) -> String {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}_{extractor}.bin")
}

/// Write every extracted payload into `dir`.
///
/// Images without any payload still get a manifest entry with no files.
pub fn write_payloads(
    extracted: &[ExtractedImage],
    dir: &Path,
) -> Result<ExtractionManifest, ReportError> {
    std::fs::create_dir_all(dir)?;

    let mut images = Vec::with_capacity(extracted.len());
    for item in extracted {
        let mut files = BTreeMap::new();
        for (extractor, payload) in &item.data {
            let path = dir.join(payload_file_name(&item.path, extractor));
            std::fs::write(&path, payload)?;
            tracing::debug!("Wrote {} bytes to {}", payload.len(), path.display());
            files.insert(extractor.clone(), path);
        }
        images.push(ManifestEntry {
            image: item.path.clone(),
            files,
        });
    }

    Ok(ExtractionManifest {
        version: REPORT_VERSION.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        images,
    })
}
