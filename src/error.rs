//! Error types for trueno-scal operations

use thiserror::Error;

use crate::precision::{Precision, Scalar};
use crate::transfer::Direction;
use crate::Backend;

/// Result type for trueno-scal operations
pub type Result<T> = std::result::Result<T, ScalError>;

/// Errors that can occur while scaling a vector
///
/// Worker-side failures (`ResourceExhausted`, `TransferFault`) are fatal to the
/// worker that hit them and reach the caller wrapped in `WorkerFailed`.
#[derive(Debug, Error, PartialEq)]
pub enum ScalError {
    /// Backend not supported on this platform
    #[error("Backend not supported on this platform: {0:?}")]
    UnsupportedBackend(Backend),

    /// Size mismatch between operands
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Source and destination hold different element precisions
    #[error("Precision mismatch: source is {input:?}, destination is {output:?}")]
    PrecisionMismatch {
        /// Source vector precision
        input: Precision,
        /// Destination vector precision
        output: Precision,
    },

    /// The scale factor has no exact representation in the operation precision
    #[error("Scalar {value:?} is not exactly representable as {precision:?}")]
    ScalarNotRepresentable {
        /// Tagged value supplied by the caller
        value: Scalar,
        /// Precision it had to resolve to
        precision: Precision,
    },

    /// Invalid configuration or launch parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local store cannot satisfy a staging buffer request
    #[error("Local store exhausted: requested {requested} bytes, {available} available")]
    ResourceExhausted {
        /// Bytes requested
        requested: usize,
        /// Bytes still free in the store
        available: usize,
    },

    /// The bulk-transfer substrate reported a fault
    #[error("Transfer fault ({direction:?} at element {offset}): {reason}")]
    TransferFault {
        /// Direction of the failed transfer
        direction: Direction,
        /// Offset into the worker's partition
        offset: usize,
        /// Substrate-provided reason
        reason: String,
    },

    /// A worker terminated with an error
    #[error("Worker {worker} failed: {source}")]
    WorkerFailed {
        /// Zero-based worker index
        worker: usize,
        /// What killed the worker
        source: Box<ScalError>,
    },
}

impl ScalError {
    /// Strip any `WorkerFailed` wrapping and return the root cause
    pub fn root_cause(&self) -> &ScalError {
        match self {
            ScalError::WorkerFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
