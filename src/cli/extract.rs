//! Extract command handler.

use crate::config::ExtractConfig;
use crate::pipeline::{
    build_extractors, compute_extraction, determine_exit_code, resolve_extract_images,
    write_extraction,
};
use anyhow::Result;

/// Run the extract command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_extract(config: ExtractConfig) -> Result<i32> {
    let extractors = build_extractors(&config)?;
    let images = resolve_extract_images(&config)?;

    let outcome = compute_extraction(extractors, &images, &config.execution)?;
    write_extraction(&outcome, &config.output_dir)?;

    if outcome.has_failures() {
        tracing::warn!("{} of the extractions failed", outcome.failures.len());
    }

    Ok(determine_exit_code(
        config.fail_on_error,
        outcome.has_failures(),
    ))
}
