use std::sync::Mutex;

use rayon::{ThreadPool, ThreadPoolBuilder};

/// Worker count used when none is configured.
pub fn default_jobs() -> usize {
    num_cpus::get().max(1)
}

/// Builds a bounded pool scoped to one run instead of touching rayon's
/// global pool. Falls back to the global pool if the build fails.
pub fn build_pool(jobs: usize) -> Option<ThreadPool> {
    let jobs = jobs.max(1);
    match ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("dedup-worker-{}", i))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Could not build a {}-thread pool, using the global one: {}", jobs, e);
            None
        }
    }
}

/// Count of finished work units shared across workers.
///
/// `advance` bumps the count and runs its callback while holding the lock, so
/// callbacks observe 1, 2, 3, ... in that order even across threads.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    done: Mutex<usize>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks one unit done, hands the new total to `report` and returns it.
    pub fn advance(&self, report: impl FnOnce(usize)) -> usize {
        let mut done = self.done.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *done += 1;
        report(*done);
        *done
    }

    pub fn get(&self) -> usize {
        *self.done.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
