use crate::inner::ThreadPoolInner;
use scopeguard::defer;
use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

pub(super) struct Worker(JoinHandle<()>);

impl Worker {
    /// Start a worker thread named after the pool and its position in it
    pub(super) fn spawn(index: usize, inner: &Arc<ThreadPoolInner>) -> io::Result<Self> {
        let mut builder = thread::Builder::new().name(format!("{}-{}", inner.name(), index));
        if let Some(stack_size) = inner.stack_size() {
            builder = builder.stack_size(stack_size);
        }

        inner.worker_started();
        let for_thread = Arc::clone(inner);
        match builder.spawn(move || Self::worker_loop(for_thread)) {
            Ok(jh) => Ok(Self(jh)),
            Err(e) => {
                inner.worker_not_started();
                Err(e)
            }
        }
    }

    /// Wait for the worker to finish. If the thread panicked, it returns `false`
    pub(super) fn join(self) -> bool {
        // The pool is being torn down from one of its own jobs, this thread cannot wait for itself
        if self.0.thread().id() == thread::current().id() {
            return true;
        }

        self.0.join().is_ok()
    }

    fn worker_loop(inner: Arc<ThreadPoolInner>) {
        // Runs on normal exit and while unwinding out of a panicking job. The panic itself is
        // not caught: the thread dies and the pool keeps one less live worker
        defer! {
            inner.worker_exited(thread::panicking());
        };

        while let Some(job) = inner.job_queue().get_job() {
            job();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Worker;
    use crate::inner::ThreadPoolInner;
    use std::sync::Arc;

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn failed_spawn_is_not_counted_as_live() {
        // No 64-bit Linux address space has room for a 1 PiB stack
        let inner = Arc::new(ThreadPoolInner::new("huge".to_owned(), Some(1 << 50)));

        assert!(Worker::spawn(0, &inner).is_err());
        assert_eq!(inner.live_workers(), 0);
    }
}
