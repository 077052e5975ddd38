use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{QaError, Result};

pub const DEFAULT_WORKERS: usize = 8;

/// Fixed-size pool that maps a fallible job over a list of inputs.
///
/// Results come back in input order. The first failing job aborts the
/// map and its error is returned; no partial output is kept.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(QaError::InvalidPool);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("qahpc-worker-{i}"))
            .build()
            .map_err(|e| QaError::Format(format!("worker pool: {e}")))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        self.pool
            .install(|| items.into_par_iter().map(&f).collect::<Result<Vec<_>>>())
    }
}
