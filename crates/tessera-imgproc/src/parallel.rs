use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use thiserror::Error;

use crate::error::FilterError;
use crate::tiling;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how the tiles of one filter call are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run on a pool sized from the available parallelism, keeping the
    /// reserved units free for the caller.
    #[default]
    Auto,

    /// Run every tile sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with exactly `n` threads.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Number of workers this strategy runs with.
    ///
    /// # Arguments
    ///
    /// * `reserved` - Execution units kept free for the caller (only used by `Auto`).
    pub fn num_workers(&self, reserved: usize) -> Result<usize, ParallelError> {
        match *self {
            ExecutionStrategy::Serial => Ok(1),
            ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
            ExecutionStrategy::Fixed(n) => Ok(n),
            ExecutionStrategy::Auto => {
                let available = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(2);
                Ok(tiling::worker_count(available, reserved))
            }
        }
    }
}

/// Run `op` once per job and wait for all of them.
///
/// Jobs are independent and may finish in any order. The first error, or a
/// panic inside any job, fails the whole run once the pool has been joined.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `num_workers` - Size of the local pool for parallel strategies.
/// * `jobs` - One entry per tile; each is consumed by exactly one call.
/// * `op` - The per-job work.
pub(crate) fn execute_jobs<J, F>(
    strategy: ExecutionStrategy,
    num_workers: usize,
    jobs: Vec<J>,
    op: F,
) -> Result<(), FilterError>
where
    J: Send,
    F: Fn(J) -> Result<(), FilterError> + Sync + Send,
{
    if num_workers == 0 {
        return Err(ParallelError::InvalidThreadCount(0).into());
    }

    let run = move || -> Result<(), FilterError> {
        if strategy == ExecutionStrategy::Serial || num_workers == 1 {
            return jobs.into_iter().try_for_each(&op);
        }

        // never spin up more threads than there are tiles
        let threads = num_workers.min(jobs.len().max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ParallelError::BuildError(e.to_string()))?;

        pool.install(|| jobs.into_par_iter().try_for_each(&op))
    };

    panic::catch_unwind(AssertUnwindSafe(run))
        .unwrap_or_else(|payload| Err(FilterError::WorkerPanicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_execute_serial() -> Result<(), FilterError> {
        let counter = AtomicUsize::new(0);
        execute_jobs(ExecutionStrategy::Serial, 1, vec![1, 2, 3, 4], |j| {
            counter.fetch_add(j, Ordering::Relaxed);
            Ok(())
        })?;
        assert_eq!(counter.load(Ordering::Relaxed), 10);
        Ok(())
    }

    #[test]
    fn test_execute_fixed() -> Result<(), FilterError> {
        let counter = AtomicUsize::new(0);
        execute_jobs(ExecutionStrategy::Fixed(2), 2, (0..100).collect(), |j| {
            counter.fetch_add(j, Ordering::Relaxed);
            Ok(())
        })?;
        assert_eq!(counter.load(Ordering::Relaxed), 4950);
        Ok(())
    }

    #[test]
    fn test_execute_error_propagates() {
        let res = execute_jobs(ExecutionStrategy::Fixed(2), 2, vec![0, 1, 2], |j| {
            if j == 1 {
                Err(FilterError::InvalidTileSize)
            } else {
                Ok(())
            }
        });
        assert_eq!(res, Err(FilterError::InvalidTileSize));
    }

    #[test]
    fn test_execute_panic_is_reported() {
        let res = execute_jobs(ExecutionStrategy::Fixed(2), 2, vec![0, 1], |j| {
            if j == 1 {
                panic!("tile exploded");
            }
            Ok(())
        });
        assert_eq!(
            res,
            Err(FilterError::WorkerPanicked("tile exploded".to_string()))
        );
    }

    #[test]
    fn test_num_workers() {
        assert_eq!(ExecutionStrategy::Serial.num_workers(1), Ok(1));
        assert_eq!(ExecutionStrategy::Fixed(3).num_workers(1), Ok(3));
        assert_eq!(
            ExecutionStrategy::Fixed(0).num_workers(1),
            Err(ParallelError::InvalidThreadCount(0))
        );
        assert!(ExecutionStrategy::Auto.num_workers(1).is_ok_and(|n| n >= 1));
    }
}
