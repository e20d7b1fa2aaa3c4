use super::Job;
use parking_lot::{Condvar, Mutex};
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
};

/// Shared FIFO of pending jobs plus the pool's running flag.
pub(super) struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    not_empty: Condvar,
    running: AtomicBool,
}

impl JobQueue {
    pub(super) fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            running: AtomicBool::new(true),
        }
    }

    /// Enqueue job and notify one sleeping thread
    pub(super) fn push(&self, job: Job) {
        self.jobs.lock().push_back(job);
        self.not_empty.notify_one();
    }

    /// Enqueue the whole batch under a single lock acquisition, then wake every sleeping thread
    pub(super) fn push_batch(&self, batch: Vec<Job>) {
        self.jobs.lock().extend(batch);
        self.not_empty.notify_all();
    }

    pub(super) fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub(super) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the running flag and wake up sleeping threads.
    ///
    /// Returns the number of jobs left in the queue, or `None` if the queue was already stopped.
    pub(super) fn stop(&self) -> Option<usize> {
        // The flag flips under the lock, otherwise a worker could check it and then
        // sleep through the wake-up below
        let lock = self.jobs.lock();
        if !self.running.swap(false, Ordering::AcqRel) {
            return None;
        }
        let abandoned = lock.len();
        drop(lock);

        self.not_empty.notify_all();
        Some(abandoned)
    }

    /// Get next job from the queue. If the queue is empty, then thread sleeps until
    /// adding new elements.
    ///
    /// Return `None` as soon as the queue is stopped, even if jobs are still pending.
    pub(super) fn get_job(&self) -> Option<Job> {
        let mut lock = self.jobs.lock();

        loop {
            if !self.is_running() {
                return None;
            }

            if let Some(job) = lock.pop_front() {
                return Some(job);
            }

            self.not_empty.wait(&mut lock);
        }
    }
}
