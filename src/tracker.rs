use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts down the jobs of one blocking batch and lets the submitter wait for zero.
pub(super) struct CompletionTracker {
    remaining: AtomicUsize,
    lock: Mutex<()>,
    finished: Condvar,
}

impl CompletionTracker {
    pub(super) fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            lock: Mutex::new(()),
            finished: Condvar::new(),
        }
    }

    /// Mark one job of the batch as done
    pub(super) fn complete(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            // Taking the lock orders the notification after the waiter's last check
            let _lock = self.lock.lock();
            self.finished.notify_all();
        }
    }

    /// Block until every job of the batch has called `complete`
    pub(super) fn wait(&self) {
        let mut lock = self.lock.lock();
        while self.remaining.load(Ordering::Acquire) > 0 {
            self.finished.wait(&mut lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompletionTracker;
    use std::{sync::Arc, thread, time::Duration};

    #[test]
    fn empty_batch_does_not_block() {
        CompletionTracker::new(0).wait();
    }

    #[test]
    fn wait_returns_after_last_completion() {
        let tracker = Arc::new(CompletionTracker::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5 * i));
                    tracker.complete();
                })
            })
            .collect();

        tracker.wait();
        assert_eq!(tracker.remaining.load(std::sync::atomic::Ordering::Acquire), 0);

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
