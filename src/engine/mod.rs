//! Execution of comparisons and extractions.
//!
//! Both executors share the same shape: a task per work item (a pair or an
//! image), run either in order or on a bounded [`WorkerPool`], with
//! per-strategy failures isolated from the rest of the run.

mod compare;
mod extract;
mod pool;

pub use compare::{ComparisonExecutor, ComparisonFailure, ExecutionOutcome};
pub use extract::{ExtractedImage, ExtractionExecutor, ExtractionFailure, ExtractionOutcome};
pub use pool::WorkerPool;

use crate::strategies::StrategyError;
use std::time::{Duration, Instant};

/// Cooperative time budget of one task.
///
/// Checked before and after each strategy call; a running call is never
/// interrupted.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn check(&self) -> Result<(), StrategyError> {
        match self.budget {
            Some(budget) if self.started.elapsed() > budget => {
                Err(StrategyError::DeadlineExceeded(budget))
            }
            _ => Ok(()),
        }
    }
}
