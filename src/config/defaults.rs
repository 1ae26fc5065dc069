//! Default values shared by configuration, CLI and strategies.

/// Strings longer than this many characters are truncated in reports.
pub const DEFAULT_MAX_VALUE_LEN: usize = 100;

/// Worker threads per available CPU in parallel mode.
pub const DEFAULT_WORKER_MULTIPLIER: usize = 2;

/// Number of worker threads for parallel execution.
///
/// `multiplier × available_parallelism`, capped at `max_workers` and never
/// below one.
#[must_use]
pub fn worker_count(multiplier: usize, max_workers: Option<usize>) -> usize {
    let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    let threads = cpus.saturating_mul(multiplier.max(1));
    max_workers.map_or(threads, |cap| threads.min(cap)).max(1)
}
