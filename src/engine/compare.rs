//! Comparison executor.

use super::pool::WorkerPool;
use super::Deadline;
use crate::config::ExecutionConfig;
use crate::error::Result;
use crate::model::{merge, DiffResult, Image, ImagePair};
use crate::strategies::{Comparator, StrategyError};
use image::RgbaImage;
use std::fmt;
use std::path::PathBuf;

/// A comparator call that failed for one pair.
///
/// The pair's result simply lacks that comparator's entries.
#[derive(Debug)]
pub struct ComparisonFailure {
    pub comparator: String,
    pub cover: PathBuf,
    pub stego: PathBuf,
    pub error: StrategyError,
}

impl fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} / {}: {}",
            self.comparator,
            self.cover.display(),
            self.stego.display(),
            self.error
        )
    }
}

/// Results in resolver order, plus every isolated failure.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub results: Vec<DiffResult>,
    pub failures: Vec<ComparisonFailure>,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the selected comparators over a list of pairs.
///
/// Stateless comparators run per pair, sequentially or on a bounded worker
/// pool. Sequential comparators (reduce modes) run afterwards in a single
/// fold over the pairs in resolver order.
pub struct ComparisonExecutor {
    stateless: Vec<Comparator>,
    sequential: Vec<Comparator>,
    execution: ExecutionConfig,
}

impl ComparisonExecutor {
    #[must_use]
    pub fn new(comparators: Vec<Comparator>, execution: ExecutionConfig) -> Self {
        let (sequential, stateless): (Vec<_>, Vec<_>) =
            comparators.into_iter().partition(Comparator::is_sequential);
        Self {
            stateless,
            sequential,
            execution,
        }
    }

    /// Compare every pair.
    ///
    /// Strategy failures are isolated and reported in the outcome. Only a
    /// broken invariant (merging results of different pairs) or a pool that
    /// cannot be built is returned as an error.
    pub fn execute(&self, pairs: &[ImagePair]) -> Result<ExecutionOutcome> {
        let stage = if self.execution.parallel && pairs.len() > 1 {
            let pool = WorkerPool::new(self.execution.worker_count())?;
            tracing::info!(
                "Comparing {} pairs on {} workers",
                pairs.len(),
                pool.threads()
            );
            pool.map_ordered(pairs, |_, pair| self.compare_pair(pair))
        } else {
            tracing::info!("Comparing {} pairs", pairs.len());
            pairs.iter().map(|pair| self.compare_pair(pair)).collect()
        };

        let mut outcome = ExecutionOutcome::default();
        for pair_outcome in stage {
            let (result, failures) = pair_outcome?;
            outcome.results.push(result);
            outcome.failures.extend(failures);
        }

        for comparator in &self.sequential {
            self.fold(comparator, pairs, &mut outcome)?;
        }

        for failure in &outcome.failures {
            tracing::warn!("{failure}");
        }
        Ok(outcome)
    }

    fn compare_pair(&self, pair: &ImagePair) -> Result<(DiffResult, Vec<ComparisonFailure>)> {
        tracing::debug!(
            "Comparing {} with {}",
            pair.cover.display(),
            pair.stego.display()
        );
        let cover = Image::open(&pair.cover);
        let stego = Image::open(&pair.stego);
        let deadline = Deadline::start(self.execution.task_deadline());

        let mut result = DiffResult::empty(&pair.cover, &pair.stego);
        let mut failures = Vec::new();

        for comparator in &self.stateless {
            let outcome = deadline
                .check()
                .and_then(|()| comparator.compare(&cover, &stego))
                .and_then(|diff| deadline.check().map(|()| diff));
            match outcome {
                Ok(diff) => {
                    let partial =
                        DiffResult::single(&pair.cover, &pair.stego, comparator.name(), diff);
                    result = merge(result, partial)?;
                }
                Err(error) => failures.push(failure(comparator, pair, error)),
            }
        }

        Ok((result, failures))
    }

    /// Thread the carried composite through all pairs in order.
    ///
    /// A failed step keeps the carried state of the previous step.
    fn fold(
        &self,
        comparator: &Comparator,
        pairs: &[ImagePair],
        outcome: &mut ExecutionOutcome,
    ) -> Result<()> {
        tracing::info!("Folding {} over {} pairs", comparator.name(), pairs.len());
        let mut carried: Option<RgbaImage> = None;

        for (pair, result) in pairs.iter().zip(outcome.results.iter_mut()) {
            let cover = Image::open(&pair.cover);
            let stego = Image::open(&pair.stego);
            let deadline = Deadline::start(self.execution.task_deadline());

            let step = deadline
                .check()
                .and_then(|()| comparator.fold(carried.as_ref(), &cover, &stego))
                .and_then(|step| deadline.check().map(|()| step));
            match step {
                Ok((diff, next)) => {
                    let partial =
                        DiffResult::single(&pair.cover, &pair.stego, comparator.name(), diff);
                    let current =
                        std::mem::replace(result, DiffResult::empty(&pair.cover, &pair.stego));
                    *result = merge(current, partial)?;
                    if next.is_some() {
                        carried = next;
                    }
                }
                Err(error) => outcome.failures.push(failure(comparator, pair, error)),
            }
        }
        Ok(())
    }
}

fn failure(comparator: &Comparator, pair: &ImagePair, error: StrategyError) -> ComparisonFailure {
    ComparisonFailure {
        comparator: comparator.name().to_string(),
        cover: pair.cover.clone(),
        stego: pair.stego.clone(),
        error,
    }
}
