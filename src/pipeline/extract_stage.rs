//! Extraction stage.

use crate::config::{ExecutionConfig, ExtractConfig};
use crate::engine::{ExtractionExecutor, ExtractionOutcome};
use crate::reports::{write_payloads, ExtractionManifest, JsonReporter, MANIFEST_FILE_NAME};
use crate::strategies::{Extractor, StrategyRegistry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Resolve and configure the extractors selected by `config`.
pub fn build_extractors(config: &ExtractConfig) -> Result<Vec<Extractor>> {
    let extractors = StrategyRegistry::new()
        .resolve_extractors(&config.extractors, &config.params)
        .context("Failed to set up extractors")?;

    tracing::info!(
        "Using extractors: {}",
        extractors
            .iter()
            .map(Extractor::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(extractors)
}

/// Run `extractors` over every image.
pub fn compute_extraction(
    extractors: Vec<Extractor>,
    images: &[PathBuf],
    execution: &ExecutionConfig,
) -> Result<ExtractionOutcome> {
    tracing::info!("Extracting from {} images...", images.len());

    let outcome = ExtractionExecutor::new(extractors, execution.clone())
        .execute(images)
        .context("Failed to extract payloads")?;

    tracing::info!(
        "Extraction complete: {} images, {} failed extractions",
        outcome.extracted.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}

/// Write payload files and the manifest into `dir`.
pub fn write_extraction(outcome: &ExtractionOutcome, dir: &Path) -> Result<ExtractionManifest> {
    let manifest = write_payloads(&outcome.extracted, dir)
        .with_context(|| format!("Failed to write payloads to {}", dir.display()))?;

    let path = dir.join(MANIFEST_FILE_NAME);
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    JsonReporter::new()
        .write_to(&manifest, &mut writer)
        .and_then(|()| writer.flush().map_err(Into::into))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Payloads and manifest written to {}", dir.display());
    Ok(manifest)
}
