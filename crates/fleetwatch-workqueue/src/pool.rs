//! Bounded worker pool.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;

/// Results of one pool run.
#[derive(Debug)]
pub struct PoolOutcome<R, E> {
    /// Successful results, in completion order.
    pub results: Vec<R>,
    /// Failures, in completion order.
    pub errors: Vec<E>,
}

impl<R, E> PoolOutcome<R, E> {
    /// Results plus the first error to complete, if any.
    pub fn into_parts(self) -> (Vec<R>, Option<E>) {
        (self.results, self.errors.into_iter().next())
    }
}

/// Worker pool with a fixed number of workers.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// Create a pool. A size of 0 is treated as 1.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Configured number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `f` over every item and wait for all of them.
    ///
    /// At most `size` invocations of `f` are in flight at once. Items are
    /// taken first-come-first-served from a shared queue, so result order
    /// does not follow input order. Every item is attempted regardless of
    /// earlier failures.
    pub async fn run<T, R, E, F, Fut>(&self, items: Vec<T>, f: F) -> PoolOutcome<R, E>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let total = items.len();
        let mut outcome = PoolOutcome {
            results: Vec::with_capacity(total),
            errors: Vec::new(),
        };
        if total == 0 {
            return outcome;
        }

        let workers = self.size.min(total);
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let f = Arc::new(f);
        let (tx, mut rx) = mpsc::unbounded_channel::<Result<R, E>>();

        let mut set = JoinSet::new();
        for worker_id in 0..workers {
            let queue = queue.clone();
            let f = f.clone();
            let tx = tx.clone();
            set.spawn(async move {
                let mut processed = 0usize;
                loop {
                    let next = queue.lock().pop_front();
                    let Some(item) = next else {
                        break;
                    };
                    let result = (*f)(item).await;
                    // The receiver outlives every worker.
                    let _ = tx.send(result);
                    processed += 1;
                }
                debug!(worker_id, processed, "worker drained queue");
            });
        }
        drop(tx);

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                error!("pool worker terminated abnormally: {}", e);
            }
        }

        // All senders are gone once the workers have joined, so this drain
        // sees every result and then ends.
        while let Some(result) = rx.recv().await {
            match result {
                Ok(r) => outcome.results.push(r),
                Err(e) => outcome.errors.push(e),
            }
        }

        debug!(
            workers,
            total,
            succeeded = outcome.results.len(),
            failed = outcome.errors.len(),
            "pool run finished"
        );
        outcome
    }
}

/// Run `f` over `items` with at most `pool_size` concurrent workers.
///
/// Returns every successful result and the first error to complete.
pub async fn run_bounded<T, R, E, F, Fut>(
    items: Vec<T>,
    pool_size: usize,
    f: F,
) -> (Vec<R>, Option<E>)
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    WorkerPool::new(pool_size).run(items, f).await.into_parts()
}
