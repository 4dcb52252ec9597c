//! Gradebook Index Structures
//!
//! - **GradeIndex**: two-level inverted index, course → grade → records,
//!   answering "grade ≥ threshold in course" with a lower-bound lookup
//!
//! # Architecture
//!
//! ```text
//! Query: "records with DSA grade >= 8"
//!        ↓
//! courses["DSA"]            O(log courses)
//!        ↓
//! grades.range(8..)         O(log grades), lower bound
//!        ↓
//! {8: [r4, r1], 9: [r2], 10: [r7]}  → [r4, r1, r2, r7]
//! ```

mod grade_index;

pub use grade_index::GradeIndex;

use serde::Serialize;

/// Statistics about a built index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Records visited during the build
    pub records_indexed: usize,
    /// Distinct courses
    pub courses: usize,
    /// Distinct (course, grade) buckets
    pub grade_buckets: usize,
    /// Total (course, grade, record) entries
    pub entries: usize,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} courses, {} grade buckets, {} entries",
            self.records_indexed, self.courses, self.grade_buckets, self.entries
        )
    }
}
