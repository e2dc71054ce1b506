//! Error types for buffer operations.

use thiserror::Error;

/// Buffer operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Requested a position at or beyond the buffer capacity.
    #[error("buffer: index {index} out of range for capacity {capacity}")]
    OutOfRange { index: usize, capacity: usize },

    /// Tried to create a buffer that can hold nothing.
    #[error("buffer: capacity must be greater than 0")]
    ZeroCapacity,
}
