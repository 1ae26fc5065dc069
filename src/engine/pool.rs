//! Bounded worker pool with ordered results.

use crate::error::{ImageDiffError, Result};
use std::sync::mpsc;

/// A fixed-size rayon pool.
///
/// Tasks report back over a completion channel in whatever order they
/// finish; results are re-sorted by submission index before they are
/// returned.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("imagediff-worker-{i}"))
            .build()
            .map_err(|e| ImageDiffError::config(format!("failed to build worker pool: {e}")))?;
        tracing::debug!("Started worker pool with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` on every item and return the results in item order.
    pub fn map_ordered<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync,
    {
        let (tx, rx) = mpsc::channel::<(usize, R)>();
        let task = &task;

        self.pool.scope(|scope| {
            for (index, item) in items.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    // the receiver outlives the scope, so send cannot fail
                    let _ = tx.send((index, task(index, item)));
                });
            }
        });
        drop(tx);

        let mut completed: Vec<(usize, R)> = rx.into_iter().collect();
        completed.sort_by_key(|(index, _)| *index);
        completed.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_results_keep_item_order() {
        let pool = WorkerPool::new(4).unwrap();
        let items: Vec<u64> = (0..32).collect();
        // later items finish first
        let results = pool.map_ordered(&items, |_, n| {
            std::thread::sleep(Duration::from_millis(32 - n));
            n * 10
        });
        assert_eq!(results, items.iter().map(|n| n * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        let pool = WorkerPool::new(2).unwrap();
        let results: Vec<u8> = pool.map_ordered(&[] as &[u8], |_, n| *n);
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_threads_clamped() {
        assert_eq!(WorkerPool::new(0).unwrap().threads(), 1);
    }
}
