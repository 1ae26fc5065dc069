//! Report output stage.
//!
//! Writes the combined report to a file or stdout, or one report per pair
//! into a directory in split mode.

use super::{write_output, OutputTarget};
use crate::config::DiffConfig;
use crate::error::{ImageDiffError, ReportErrorKind};
use crate::model::DiffResult;
use crate::reports::{build_report, build_split_reports, JsonReporter, Normalizer};
use anyhow::{Context, Result};
use std::collections::HashSet;

/// Output a diff report to the configured destination.
pub fn output_report(config: &DiffConfig, results: &[DiffResult]) -> Result<()> {
    let normalizer = Normalizer::from_config(&config.output);
    let reporter = JsonReporter::new().pretty(config.output.pretty);

    if config.split {
        let Some(dir) = &config.output_path else {
            return Err(ImageDiffError::report(
                "split output",
                ReportErrorKind::SplitWithoutDirectory,
            )
            .into());
        };

        let documents = build_split_reports(results, normalizer);
        let mut names = HashSet::new();
        if let Some((name, _)) = documents.iter().find(|(name, _)| !names.insert(name)) {
            return Err(ImageDiffError::config(format!(
                "several pairs would write the split report {name}"
            ))
            .into());
        }

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for (file_name, document) in &documents {
            let path = dir.join(file_name);
            let rendered = reporter
                .render(document)
                .with_context(|| format!("Failed to render {file_name}"))?;
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!("Wrote {}", path.display());
        }
        tracing::info!("Wrote {} reports to {}", documents.len(), dir.display());
        return Ok(());
    }

    let document = build_report(results, normalizer);
    let rendered = reporter.render(&document).context("Failed to render report")?;
    write_output(
        &rendered,
        &OutputTarget::from_option(config.output_path.clone()),
    )
}
