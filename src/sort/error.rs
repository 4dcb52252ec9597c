//! Sort engine error types

use thiserror::Error;

/// Errors that abort a parallel sort
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// Worker count of zero was requested
    #[error("Sort needs at least one worker")]
    NoWorkers,

    /// A worker thread panicked; no partial result is usable
    #[error("Sort worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },
}

/// Result type alias for sort operations
pub type SortResult<T> = Result<T, SortError>;
