//! Error types for escalar
//!
//! One central error enum for the whole crate. Submission-time argument
//! errors (`InvalidDimension`, `InvalidStride`, `BufferMismatch`) are
//! reported synchronously by the dispatching call; errors that occur inside
//! the executor worker (`UnknownBuffer`, worker-side `BufferMismatch`)
//! surface asynchronously when the corresponding event is waited on, so the
//! enum is `Clone` to let every clone of an event observe the same failure.

use thiserror::Error;

/// Error type for all escalar operations
#[derive(Debug, Clone, Error)]
pub enum EscalarError {
    /// Element count is invalid for the requested operation
    #[error("Invalid dimension: {reason}")]
    InvalidDimension {
        /// What was wrong with the dimension
        reason: String,
    },

    /// Stride must be strictly positive
    #[error("Invalid stride: {reason}")]
    InvalidStride {
        /// What was wrong with the stride
        reason: String,
    },

    /// Buffer does not match the operation's requirements
    #[error("Buffer mismatch: {reason}")]
    BufferMismatch {
        /// Length, precision, or aliasing problem
        reason: String,
    },

    /// A task referenced a buffer id with no live allocation
    #[error("Unknown device buffer {id} (freed or never allocated)")]
    UnknownBuffer {
        /// The stale handle id
        id: u64,
    },

    /// The requested backend could not be brought up
    #[error("Backend unavailable: {reason}")]
    BackendUnavailable {
        /// Why the backend failed to start
        reason: String,
    },

    /// The executor queue has shut down; no further work can be submitted
    #[error("Executor queue closed")]
    QueueClosed,
}

/// Result type alias for escalar operations
pub type Result<T> = std::result::Result<T, EscalarError>;
