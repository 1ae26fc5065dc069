//! Diff computation stage.

use crate::config::{DiffConfig, ExecutionConfig};
use crate::engine::{ComparisonExecutor, ExecutionOutcome};
use crate::error::ImageDiffError;
use crate::model::ImagePair;
use crate::strategies::{Comparator, StrategyRegistry};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolve and configure the comparators selected by `config`.
pub fn build_comparators(config: &DiffConfig) -> Result<Vec<Comparator>> {
    let comparators = StrategyRegistry::new()
        .resolve_comparators(&config.comparators, &config.params)
        .context("Failed to set up comparators")?;

    tracing::info!(
        "Using comparators: {}",
        comparators
            .iter()
            .map(Comparator::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(comparators)
}

/// Fail if two pairs would write the same file.
///
/// Output names are built from file names only, so pairs gathered from
/// different subdirectories can collide. Covers the diff and composite
/// images of every comparator and, with `split`, the per-pair reports.
pub fn check_output_names(
    comparators: &[Comparator],
    pairs: &[ImagePair],
    split: bool,
) -> Result<()> {
    let mut claimed: HashMap<PathBuf, &ImagePair> = HashMap::new();

    for pair in pairs {
        let report = split.then(|| PathBuf::from(pair.report_file_name()));
        let images = comparators
            .iter()
            .filter_map(|c| c.output_path(&pair.cover, &pair.stego));

        for path in report.into_iter().chain(images) {
            if let Some(previous) = claimed.insert(path.clone(), pair) {
                return Err(ImageDiffError::config(format!(
                    "{} and {} would both write {}; give the images distinct file names",
                    describe(previous),
                    describe(pair),
                    path.display()
                ))
                .into());
            }
        }
    }
    Ok(())
}

fn describe(pair: &ImagePair) -> String {
    format!("({}, {})", pair.cover.display(), pair.stego.display())
}

/// Run `comparators` over every pair.
pub fn compute_diff(
    comparators: Vec<Comparator>,
    pairs: &[ImagePair],
    execution: &ExecutionConfig,
) -> Result<ExecutionOutcome> {
    tracing::info!("Comparing {} image pairs...", pairs.len());

    let outcome = ComparisonExecutor::new(comparators, execution.clone())
        .execute(pairs)
        .context("Failed to compute diff")?;

    let changes: usize = outcome.results.iter().map(|r| r.change_count()).sum();
    tracing::info!(
        "Diff complete: {} pairs, {} changes, {} failed comparisons",
        outcome.results.len(),
        changes,
        outcome.failures.len()
    );
    Ok(outcome)
}
