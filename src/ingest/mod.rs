//! Record ingestion
//!
//! Reads delimited text into validated [`Record`](crate::record::Record)s:
//! - Student file: `name, identifier, category, year`
//! - Course file: `identifier, course` (enrollment) or
//!   `identifier, course, grade` (completed course)
//!
//! Malformed lines are skipped and counted, never fatal.

mod delimited;

pub use delimited::{CourseImportResult, DelimitedImporter, StudentImportResult};

/// Errors that can occur while reading an input source
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ingestion
pub type IngestResult<T> = Result<T, IngestError>;
