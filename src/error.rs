use thiserror::Error;

/// Errors reported synchronously by pool construction and growth
#[derive(Debug, Error)]
pub enum PoolError {
    /// `grow` was asked for fewer workers than the pool already has
    #[error("cannot shrink thread pool from {current} to {requested} workers")]
    InvalidArgument { requested: usize, current: usize },

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Error)]
#[error("detected panicked threads while join: {0}")]
pub struct JoinError(u32);

impl JoinError {
    pub(super) fn new(count: u32) -> Self {
        Self(count)
    }

    /// Number of workers that terminated by panicking
    pub fn count(&self) -> u32 {
        self.0
    }
}
