use crate::{PoolError, ThreadPool};

const DEFAULT_NAME: &str = "batchpool";

/// Configuration for a [`ThreadPool`].
///
/// ```
/// let pool = batchpool::ThreadPool::builder()
///     .name("solver")
///     .thread_count(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.size(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ThreadPoolBuilder {
    name: String,
    thread_count: Option<usize>,
    stack_size: Option<usize>,
}

impl Default for ThreadPoolBuilder {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            thread_count: None,
            stack_size: None,
        }
    }
}

impl ThreadPoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for worker thread names, threads are named `{name}-{index}`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Initial number of workers. Defaults to the number of logical CPUs.
    ///
    /// Zero is allowed: such a pool queues jobs until it is grown.
    pub fn thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = Some(thread_count);
        self
    }

    /// Stack size in bytes for every worker thread
    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    pub fn build(self) -> Result<ThreadPool, PoolError> {
        let thread_count = self.thread_count.unwrap_or_else(num_cpus::get);
        ThreadPool::start(self.name, self.stack_size, thread_count)
    }
}
