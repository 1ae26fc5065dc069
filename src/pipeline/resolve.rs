//! Input resolution stage.
//!
//! Loads the correspondence table and turns the configured inputs into
//! image pairs (diff) or stego images (extract).

use crate::config::{CorrespondenceConfig, DiffConfig, ExtractConfig};
use crate::correspondence::{resolve_pairs, resolve_stego_images, CorrespondenceTable};
use crate::model::ImagePair;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Load the configured correspondence table, if any.
pub fn load_table(config: &CorrespondenceConfig) -> Result<Option<CorrespondenceTable>> {
    let Some(path) = &config.table else {
        return Ok(None);
    };

    tracing::info!("Reading correspondence table {}", path.display());
    let table = CorrespondenceTable::from_path(path)
        .with_context(|| format!("Failed to load correspondence table {}", path.display()))?;
    tracing::debug!("Correspondence table has {} rows", table.len());
    Ok(Some(table))
}

/// Resolve the ordered pairs of a diff run.
pub fn resolve_diff_pairs(config: &DiffConfig) -> Result<Vec<ImagePair>> {
    let table = load_table(&config.correspondence)?;
    let pairs = resolve_pairs(
        &config.paths.cover,
        &config.paths.stego,
        table.as_ref(),
        &config.correspondence.filters,
    )
    .context("Failed to resolve image pairs")?;

    if pairs.is_empty() {
        tracing::warn!("No image pairs to compare");
    }
    Ok(pairs)
}

/// Resolve the stego images of an extract run.
pub fn resolve_extract_images(config: &ExtractConfig) -> Result<Vec<PathBuf>> {
    let table = load_table(&config.correspondence)?;
    let images = resolve_stego_images(
        &config.stego,
        table.as_ref(),
        &config.correspondence.filters,
    )
    .context("Failed to resolve stego images")?;

    if images.is_empty() {
        tracing::warn!("No stego images to extract from");
    }
    Ok(images)
}
