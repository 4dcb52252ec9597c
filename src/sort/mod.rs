//! Parallel sort-and-merge
//!
//! - **partition**: contiguous near-equal chunk boundaries
//! - **engine**: scoped worker threads, join barrier, stats
//! - **merge**: k-way heap merge of the sorted chunks
//! - **error**: error types
//!
//! # Example
//!
//! ```rust
//! use gradebook::record::Record;
//! use gradebook::sort::ParallelSorter;
//!
//! let records: Vec<Record<u64>> = vec![
//!     Record::new("A", 5, "CS", 2025),
//!     Record::new("B", 2, "CS", 2025),
//!     Record::new("C", 8, "EE", 2024),
//! ];
//!
//! let mut view: Vec<&Record<u64>> = records.iter().collect();
//! ParallelSorter::new(2).sort(&mut view).unwrap();
//!
//! let ids: Vec<u64> = view.iter().map(|r| *r.id()).collect();
//! assert_eq!(ids, vec![2, 5, 8]);
//! ```

mod engine;
mod error;
mod merge;
mod partition;

pub use engine::{ParallelSorter, SortConfig, SortStats};
pub use error::{SortError, SortResult};
pub use merge::{merge_chunks, merge_runs};
pub use partition::{chunk_bounds, split_chunks};
