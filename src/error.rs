//! Error types.

use core::fmt;
use thiserror::Error;

/// Rejected queue construction. The queue is never created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Requested capacity was zero.
    #[error("capacity must be positive")]
    ZeroCapacity,

    /// A runtime capacity was supplied for inline storage and it disagrees
    /// with the compile-time one.
    #[error("capacity mismatch: storage holds {compile_time} slots, {runtime} requested")]
    CapacityMismatch {
        /// Capacity fixed by the storage type.
        compile_time: usize,
        /// Capacity passed to the constructor.
        runtime: usize,
    },

    /// The allocator could not provide the padded slot array.
    #[error("failed to allocate {slots} slots")]
    Allocation {
        /// Total slot count requested, padding included.
        slots: usize,
    },
}

/// Returned by `try_push` when the queue is full. Carries the rejected value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Recover the value that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushError(..)")
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full")
    }
}

impl<T> std::error::Error for PushError<T> {}
