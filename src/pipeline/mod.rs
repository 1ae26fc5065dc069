//! Pipeline orchestration for diff and extract runs.
//!
//! This module provides the resolve → execute → report stages shared by the
//! CLI command handlers. Every fatal configuration check (strategy
//! selection, parameter parsing, pair resolution) happens in the resolve
//! stages, before any comparison or extraction starts.

mod diff_stage;
mod extract_stage;
mod output;
mod report_stage;
mod resolve;

pub use diff_stage::{build_comparators, check_output_names, compute_diff};
pub use extract_stage::{build_extractors, compute_extraction, write_extraction};
pub use output::{write_output, OutputTarget};
pub use report_stage::output_report;
pub use resolve::{load_table, resolve_diff_pairs, resolve_extract_images};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success, including runs with isolated per-item failures
    pub const SUCCESS: i32 = 0;
    /// A fatal error aborted the run
    pub const ERROR: i32 = 1;
    /// Some comparisons or extractions failed and `--fail-on-error` was set
    pub const ITEM_FAILURES: i32 = 2;
}

/// Exit code of a completed run.
#[must_use]
pub const fn determine_exit_code(fail_on_error: bool, has_failures: bool) -> i32 {
    if fail_on_error && has_failures {
        exit_codes::ITEM_FAILURES
    } else {
        exit_codes::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::ITEM_FAILURES, 2);
    }

    #[test]
    fn test_failures_only_fail_when_requested() {
        assert_eq!(determine_exit_code(false, true), exit_codes::SUCCESS);
        assert_eq!(determine_exit_code(true, false), exit_codes::SUCCESS);
        assert_eq!(determine_exit_code(true, true), exit_codes::ITEM_FAILURES);
    }
}
