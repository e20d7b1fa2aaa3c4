use super::queue::JobQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error};

/// State shared between the pool handle and its worker threads
pub(super) struct ThreadPoolInner {
    job_queue: JobQueue,
    live_workers: AtomicUsize,
    name: String,
    stack_size: Option<usize>,
}

impl ThreadPoolInner {
    pub(super) fn new(name: String, stack_size: Option<usize>) -> Self {
        Self {
            job_queue: JobQueue::new(),
            live_workers: AtomicUsize::new(0),
            name,
            stack_size,
        }
    }

    pub(super) fn job_queue(&self) -> &JobQueue {
        &self.job_queue
    }

    pub(super) fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }

    pub(super) fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::Acquire)
    }

    pub(super) fn worker_started(&self) {
        self.live_workers.fetch_add(1, Ordering::AcqRel);
    }

    /// Undo `worker_started` for a thread the OS refused to start
    pub(super) fn worker_not_started(&self) {
        self.live_workers.fetch_sub(1, Ordering::AcqRel);
    }

    pub(super) fn worker_exited(&self, panicked: bool) {
        let remaining = self.live_workers.fetch_sub(1, Ordering::AcqRel) - 1;

        if panicked {
            error!(
                pool = %self.name,
                live_workers = remaining,
                "worker terminated by a panicking job"
            );
        } else {
            debug!(pool = %self.name, live_workers = remaining, "worker exited");
        }
    }
}
