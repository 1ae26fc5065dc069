//! Diff command handler.
//!
//! Implements the `diff` subcommand for comparing cover and stego images.

use crate::config::DiffConfig;
use crate::pipeline::{
    build_comparators, check_output_names, compute_diff, determine_exit_code, output_report,
    resolve_diff_pairs,
};
use anyhow::{bail, Result};

/// Run the diff command, returning the desired exit code.
///
/// Strategy setup, pair resolution and the output name check all finish
/// before the first comparison starts, so configuration errors never leave
/// a partial report or overwritten images.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
#[allow(clippy::needless_pass_by_value)]
pub fn run_diff(config: DiffConfig) -> Result<i32> {
    if config.split && config.output_path.is_none() {
        bail!("--split requires an output directory (-o)");
    }

    let comparators = build_comparators(&config)?;
    let pairs = resolve_diff_pairs(&config)?;
    check_output_names(&comparators, &pairs, config.split)?;

    let outcome = compute_diff(comparators, &pairs, &config.execution)?;
    output_report(&config, &outcome.results)?;

    if outcome.has_failures() {
        tracing::warn!(
            "{} of the comparisons failed; affected pairs lack those entries",
            outcome.failures.len()
        );
    }

    Ok(determine_exit_code(
        config.fail_on_error,
        outcome.has_failures(),
    ))
}
