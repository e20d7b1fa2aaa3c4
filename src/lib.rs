//! Growable worker thread pool.
//!
//! Jobs go through a single shared FIFO queue and are picked up by whichever worker wakes first.
//! There are two ways to submit them:
//!
//! * non-blocking: [`ThreadPool::detach_task`] and [`ThreadPool::detach_tasks`] enqueue and return
//!   immediately, the caller gets no completion signal;
//! * blocking: [`ThreadPool::run_tasks`], [`ThreadPool::run_loop`] and
//!   [`ThreadPool::run_indexed_loop`] enqueue a batch and wait until every job of it has run.
//!   Jobs of a blocking batch may borrow from the caller's stack.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = batchpool::ThreadPool::with_threads(4).unwrap();
//! let squares: Vec<AtomicUsize> = (0..10).map(|_| AtomicUsize::new(0)).collect();
//!
//! pool.run_indexed_loop(0, 10, |i| squares[i].store(i * i, Ordering::Relaxed));
//!
//! assert_eq!(squares[9].load(Ordering::Relaxed), 81);
//! ```
//!
//! Jobs must not panic. A panicking job kills the worker that ran it, and a blocking call waiting
//! on that job never returns.

mod builder;
mod error;
mod inner;
mod queue;
mod tracker;
mod worker;

pub use builder::ThreadPoolBuilder;
pub use error::{JoinError, PoolError};

use self::{inner::ThreadPoolInner, tracker::CompletionTracker, worker::Worker};
use parking_lot::Mutex;
use std::{
    fmt::{self, Debug, Formatter},
    mem,
    sync::Arc,
};
use tracing::{debug, info, trace};


/// Job for worker
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Job of a blocking batch, allowed to borrow from the submitter
type ScopedJob<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// Fixed set of worker threads sharing one job queue.
///
/// Dropping the pool stops it and joins every worker. If the last owner is dropped from inside
/// one of the pool's own jobs, that worker is not joined: it finishes the job and exits on its own.
pub struct ThreadPool {
    inner: Arc<ThreadPoolInner>,
    workers: Mutex<Vec<Worker>>,
}

impl ThreadPool {
    /// Pool with one worker per logical CPU
    pub fn new() -> Result<Self, PoolError> {
        Self::builder().build()
    }

    pub fn with_threads(thread_count: usize) -> Result<Self, PoolError> {
        Self::builder().thread_count(thread_count).build()
    }

    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }

    pub(crate) fn start(
        name: String,
        stack_size: Option<usize>,
        thread_count: usize,
    ) -> Result<Self, PoolError> {
        let pool = Self {
            inner: Arc::new(ThreadPoolInner::new(name, stack_size)),
            workers: Mutex::new(Vec::with_capacity(thread_count)),
        };

        // On failure the partially started pool is dropped, which joins what was spawned
        pool.grow(thread_count)?;
        Ok(pool)
    }

    /// Grow the pool to `thread_count` workers.
    ///
    /// The pool never shrinks: a smaller count fails with [`PoolError::InvalidArgument`] and
    /// leaves the pool as it was.
    pub fn grow(&self, thread_count: usize) -> Result<(), PoolError> {
        let mut workers = self.workers.lock();
        let current = workers.len();

        if thread_count < current {
            return Err(PoolError::InvalidArgument {
                requested: thread_count,
                current,
            });
        }

        for index in current..thread_count {
            workers.push(Worker::spawn(index, &self.inner)?);
        }

        debug!(
            pool = %self.inner.name(),
            from = current,
            to = thread_count,
            "thread pool grown"
        );

        Ok(())
    }

    /// Number of workers the pool was started or grown with, including dead ones
    pub fn size(&self) -> usize {
        self.workers.lock().len()
    }

    /// Number of workers still running their loop
    pub fn live_workers(&self) -> usize {
        self.inner.live_workers()
    }

    /// Number of jobs waiting in the queue
    pub fn pending(&self) -> usize {
        self.inner.job_queue().len()
    }

    /// Enqueue a job and wake one idle worker
    pub fn detach_task(&self, job: impl FnOnce() + Send + 'static) {
        self.inner.job_queue().push(Box::new(job));
    }

    /// Enqueue a batch of jobs at once and wake all idle workers
    pub fn detach_tasks<I>(&self, jobs: I)
    where
        I: IntoIterator,
        I::Item: FnOnce() + Send + 'static,
    {
        let batch: Vec<Job> = jobs.into_iter().map(|job| Box::new(job) as Job).collect();
        if batch.is_empty() {
            return;
        }

        trace!(pool = %self.inner.name(), jobs = batch.len(), "detaching batch");
        self.inner.job_queue().push_batch(batch);
    }

    /// Run a batch of jobs on the pool and wait until all of them have finished
    pub fn run_tasks<'scope, I>(&self, jobs: I)
    where
        I: IntoIterator,
        I::Item: FnOnce() + Send + 'scope,
    {
        let batch: Vec<ScopedJob<'scope>> = jobs
            .into_iter()
            .map(|job| Box::new(job) as ScopedJob<'scope>)
            .collect();

        self.run_batch(batch);
    }

    /// Call `body` once for every index in `start..end` and wait for all calls to finish
    pub fn run_loop<F>(&self, start: usize, end: usize, body: F)
    where
        F: Fn() + Sync,
    {
        self.run_indexed_loop(start, end, |_| body());
    }

    /// Call `body(i)` for every `i` in `start..end` and wait for all calls to finish.
    ///
    /// Every index is delivered exactly once, in no particular order.
    pub fn run_indexed_loop<F>(&self, start: usize, end: usize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        let body = &body;
        let batch: Vec<ScopedJob<'_>> = (start..end)
            .map(|i| Box::new(move || body(i)) as ScopedJob<'_>)
            .collect();

        self.run_batch(batch);
    }

    /// Stop the pool and wait for every worker to exit.
    ///
    /// Jobs still queued are dropped without running. Fails if some workers had died by panicking.
    pub fn join(self) -> Result<(), JoinError> {
        match self.shutdown() {
            0 => Ok(()),
            panicked => Err(JoinError::new(panicked)),
        }
    }

    fn run_batch<'scope>(&self, batch: Vec<ScopedJob<'scope>>) {
        if batch.is_empty() {
            return;
        }

        trace!(pool = %self.inner.name(), jobs = batch.len(), "running batch");

        let tracker = Arc::new(CompletionTracker::new(batch.len()));
        let batch: Vec<Job> = batch
            .into_iter()
            .map(|job| {
                let tracker = Arc::clone(&tracker);
                let job: ScopedJob<'scope> = Box::new(move || {
                    job();
                    tracker.complete();
                });
                // SAFETY: we do not return until the tracker has counted every job of the batch.
                // The pool cannot stop while `&self` is borrowed, so every job is eventually run.
                // A job that panics never completes, and then this call never returns either.
                unsafe { mem::transmute::<ScopedJob<'scope>, Job>(job) }
            })
            .collect();

        self.inner.job_queue().push_batch(batch);
        tracker.wait();
    }

    /// Returns the number of workers that died by panicking
    fn shutdown(&self) -> u32 {
        let Some(abandoned) = self.inner.job_queue().stop() else {
            return 0;
        };

        let workers = mem::take(&mut *self.workers.lock());
        let total = workers.len();
        let panicked = workers
            .into_iter()
            .map(Worker::join)
            .filter(|ok| !ok)
            .count() as u32;

        info!(
            pool = %self.inner.name(),
            workers = total,
            panicked,
            abandoned,
            "thread pool stopped"
        );

        panicked
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Debug for ThreadPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("name", &self.inner.name())
            .field("size", &self.size())
            .field("live_workers", &self.live_workers())
            .field("pending", &self.pending())
            .finish()
    }
}
