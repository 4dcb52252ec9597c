//! # Gradebook
//!
//! In-memory student catalog - load delimited student and course files, sort
//! the records by identifier on parallel worker threads, and answer
//! "grade ≥ threshold in course" queries from an inverted index.
//!
//! ## Features
//!
//! - **Parallel sort**: scoped worker threads sort disjoint chunks, then a
//!   k-way merge combines them
//! - **Inverted index**: course → grade → records, lower-bound lookups
//! - **Borrowed views**: sort output and index entries reference the catalog's
//!   records, nothing is copied
//! - **Mixed course codes**: text acronyms and numeric codes in one catalog
//!
//! ## Modules
//!
//! - [`record`]: `Record` and `CourseId`
//! - [`ingest`]: delimited student and course file readers
//! - [`catalog`]: owner of the loaded records
//! - [`sort`]: parallel sort engine
//! - [`index`]: inverted grade index
//! - [`report`]: table, JSON and CSV listings; query parsing
//! - [`output`]: serialized console sink shared by sort workers
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use gradebook::{Catalog, CourseId, ParallelSorter, Record};
//!
//! let catalog: Catalog<u64> = Catalog::from_records(vec![
//!     Record::new("A", 5, "CS", 2025).grade("M", 9),
//!     Record::new("B", 2, "CS", 2025).grade("M", 7),
//!     Record::new("C", 8, "EE", 2024).grade(701u32, 9),
//! ]);
//!
//! let sorted = catalog.sorted_view(&ParallelSorter::new(2)).unwrap();
//! let ids: Vec<u64> = sorted.records.iter().map(|r| *r.id()).collect();
//! assert_eq!(ids, vec![2, 5, 8]);
//!
//! let index = catalog.grade_index();
//! let matches = index.find(&CourseId::from("M"), 8);
//! assert_eq!(matches[0].name(), "A");
//! ```

pub mod catalog;
pub mod config;
pub mod index;
pub mod ingest;
pub mod output;
pub mod record;
pub mod report;
pub mod sort;

// Re-export top-level types for convenience
pub use catalog::{Catalog, LoadSummary, SortedView};

pub use config::{Config, ConfigError, IdKind};

pub use index::{GradeIndex, IndexStats};

pub use ingest::{DelimitedImporter, IngestError, IngestResult};

pub use output::OutputSink;

pub use record::{CourseId, Grade, Record};

pub use report::{GradeQuery, QueryParseError, ReportError, ReportFormat, ReportResult};

pub use sort::{ParallelSorter, SortConfig, SortError, SortResult, SortStats};
