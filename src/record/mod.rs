//! Student records
//!
//! The value type shared by every other module. A `Record` is created once by
//! the importer, gets its enrollments and grades appended, and is read-only
//! from the moment the catalog hands out a sorted view or a grade index.

mod types;

pub use types::{CourseId, Grade, Record};
