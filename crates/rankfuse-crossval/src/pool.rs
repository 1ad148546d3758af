//! Bounded fan-out of per-fold tasks.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::{CrossValError, Phase};

/// Runs one task per fold with at most `max_parallel` in flight.
///
/// The first failing task cancels every other task of the same phase.
pub struct FoldPool {
    max_parallel: usize,
    semaphore: Arc<Semaphore>,
    total_completed: Arc<AtomicU64>,
}

impl FoldPool {
    /// Create a new pool. A limit of zero is treated as one.
    pub fn new(max_parallel: usize) -> Self {
        let permits = max_parallel.max(1);
        Self {
            max_parallel: permits,
            semaphore: Arc::new(Semaphore::new(permits)),
            total_completed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Number of fold tasks completed successfully across all phases.
    pub fn total_completed(&self) -> u64 {
        self.total_completed.load(Ordering::SeqCst)
    }

    /// Run `task` for every fold in `folds` and wait for all of them.
    ///
    /// Results come back ordered by fold index regardless of completion order.
    pub async fn run_phase<T, F, Fut>(
        &self,
        phase: Phase,
        folds: impl IntoIterator<Item = usize>,
        task: F,
    ) -> Result<Vec<(usize, T)>, CrossValError>
    where
        T: Send + 'static,
        F: Fn(usize) -> Fut,
        Fut: Future<Output = Result<T, CrossValError>> + Send + 'static,
    {
        let mut join_set = JoinSet::new();

        for fold in folds {
            let semaphore = self.semaphore.clone();
            let fut = task(fold);
            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| CrossValError::TaskFailed(e.to_string()))?;
                debug!("Fold {} started {}", fold, phase);
                fut.await.map(|value| (fold, value))
            });
        }

        let mut results = Vec::with_capacity(join_set.len());
        while let Some(joined) = join_set.join_next().await {
            let outcome = joined.map_err(CrossValError::from).and_then(|r| r);
            match outcome {
                Ok((fold, value)) => {
                    self.total_completed.fetch_add(1, Ordering::SeqCst);
                    debug!("Fold {} finished {}", fold, phase);
                    results.push((fold, value));
                }
                Err(e) => {
                    error!("Aborting {} phase: {}", phase, e);
                    join_set.abort_all();
                    return Err(e);
                }
            }
        }

        results.sort_by_key(|(fold, _)| *fold);
        Ok(results)
    }
}

/// Run blocking file work off the async workers.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, CrossValError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CrossValError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
