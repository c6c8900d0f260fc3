//! Errors in the library.
use thiserror::Error;

/// Errors returned by the buffers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    /// `sample()` was called while no partition holds an entry.
    #[error("Buffer is empty: no partition holds a batch")]
    EmptyBuffer,

    /// The token does not identify a live entry of the given partition.
    #[error("Token does not identify a live entry")]
    InvalidToken,

    /// The buffer was built with a capacity of zero.
    #[error("Invalid capacity per partition: {0}")]
    InvalidCapacity(usize),

    /// The raw priority is NaN or infinite.
    #[error("Invalid priority: {0}")]
    InvalidPriority(f64),

    /// The consumer side of a [`BufferProxy`](crate::BufferProxy) channel was dropped.
    #[error("Receiver of pushed items is disconnected")]
    Disconnected,
}

/// Result type of buffer operations.
pub type Result<T> = std::result::Result<T, BufferError>;
