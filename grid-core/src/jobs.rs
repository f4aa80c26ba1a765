//! Index-range jobs: parallel map and parallel filter over `[0, len)`.
//!
//! Both operations take a pure per-index closure. Results are always in
//! index order, whichever [`Schedule`] runs them.

use crate::{config::Schedule, error::GridError, types::ElementId};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

#[derive(Debug)]
pub struct JobRunner {
    schedule: Schedule,
    batch_size: usize,
    thread_pool: Option<ThreadPool>,
}

impl JobRunner {
    /// Builds a runner; a thread pool is only created for [`Schedule::Parallel`].
    pub fn new(
        schedule: Schedule,
        batch_size: usize,
        num_threads: Option<usize>,
    ) -> Result<Self, GridError> {
        let thread_pool = match schedule {
            Schedule::Parallel => {
                let num_threads = num_threads.unwrap_or_else(|| {
                    std::thread::available_parallelism()
                        .map(|n| n.get())
                        .unwrap_or(1)
                });
                debug!(num_threads, batch_size, "building job thread pool");
                Some(
                    ThreadPoolBuilder::new()
                        .num_threads(num_threads)
                        .build()
                        .map_err(GridError::ThreadPoolBuild)?,
                )
            }
            Schedule::Sequential => None,
        };

        Ok(Self {
            schedule,
            batch_size: batch_size.max(1),
            thread_pool,
        })
    }

    pub fn sequential() -> Self {
        Self {
            schedule: Schedule::Sequential,
            batch_size: 1,
            thread_pool: None,
        }
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    pub fn num_threads(&self) -> usize {
        self.thread_pool
            .as_ref()
            .map_or(1, |pool| pool.current_num_threads())
    }

    /// Writes `f(i)` into `out[i]` for every index. Returns once every
    /// element has been written.
    pub fn map_indexed<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(ElementId) -> T + Sync + Send,
    {
        match &self.thread_pool {
            Some(pool) => pool.install(|| {
                out.par_iter_mut()
                    .with_min_len(self.batch_size)
                    .enumerate()
                    .for_each(|(i, slot)| *slot = f(i));
            }),
            None => {
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = f(i);
                }
            }
        }
    }

    /// Replaces the contents of `out` with the ascending indices in
    /// `[0, len)` for which `keep` holds.
    pub fn filter_indices<F>(&self, len: usize, out: &mut Vec<ElementId>, keep: F)
    where
        F: Fn(ElementId) -> bool + Sync + Send,
    {
        out.clear();
        match &self.thread_pool {
            Some(pool) => pool.install(|| {
                out.par_extend(
                    (0..len)
                        .into_par_iter()
                        .with_min_len(self.batch_size)
                        .filter(|&i| keep(i)),
                );
            }),
            None => out.extend((0..len).filter(|&i| keep(i))),
        }
    }
}
