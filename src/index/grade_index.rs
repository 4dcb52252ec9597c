//! Grade Index - Inverted (course, grade) index over borrowed records
//!
//! Maps course → grade → records holding that grade, with both levels
//! ordered so a threshold query is a lower-bound lookup followed by a scan of
//! the matches only.
//!
//! # Example
//! ```ignore
//! // Records with grade >= 8 in "DSA":
//! let matches = index.find(&CourseId::from("DSA"), 8);
//! ```
//!
//! # Performance
//! - Build: O(R·C log(R·C)) for R records with C completed courses each
//! - find: O(log courses + log grades + matches)

use crate::index::IndexStats;
use crate::record::{CourseId, Grade, Record};
use std::collections::BTreeMap;
use std::ops::{Bound, RangeBounds};

/// grade → records, ascending by grade
type GradeBuckets<'a, Id, C> = BTreeMap<Grade, Vec<&'a Record<Id, C>>>;

/// Inverted index from (course, grade) to the records that hold it
///
/// Keys and values all borrow from the record collection, which therefore
/// must outlive the index. The index is immutable once built; rebuild it if
/// the records change.
#[derive(Debug)]
pub struct GradeIndex<'a, Id, C = CourseId> {
    /// course → grade → records, in traversal order within each bucket
    courses: BTreeMap<&'a C, GradeBuckets<'a, Id, C>>,
    /// Total (course, grade, record) entries
    entries: usize,
    /// Records visited during the build
    records: usize,
}

impl<'a, Id, C: Ord> GradeIndex<'a, Id, C> {
    /// Build the index over `records`
    ///
    /// Records are visited in iteration order, which is also the order of
    /// records inside each (course, grade) bucket.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record<Id, C>>,
    {
        let mut index = Self {
            courses: BTreeMap::new(),
            entries: 0,
            records: 0,
        };

        for record in records {
            index.insert(record);
        }

        tracing::info!(
            "Grade index built: {} records, {} courses, {} entries",
            index.records,
            index.courses.len(),
            index.entries
        );

        index
    }

    fn insert(&mut self, record: &'a Record<Id, C>) {
        self.records += 1;

        for (course, &grade) in record.previous_courses() {
            self.courses
                .entry(course)
                .or_default()
                .entry(grade)
                .or_default()
                .push(record);
            self.entries += 1;
        }
    }

    /// Records with a grade of at least `min_grade` in `course`
    ///
    /// Ascending by grade; records with equal grades keep build order. An
    /// unknown course gives an empty result.
    pub fn find(&self, course: &C, min_grade: Grade) -> Vec<&'a Record<Id, C>> {
        self.find_iter(course, min_grade).collect()
    }

    /// Lazy form of [`find`](Self::find)
    pub fn find_iter(
        &self,
        course: &C,
        min_grade: Grade,
    ) -> impl Iterator<Item = &'a Record<Id, C>> + '_ {
        self.courses
            .get(course)
            .into_iter()
            .flat_map(move |grades| grades.range(min_grade..))
            .flat_map(|(_, bucket)| bucket.iter().copied())
    }

    /// Records whose grade in `course` falls within `grades`
    pub fn find_between<R>(&self, course: &C, grades: R) -> Vec<&'a Record<Id, C>>
    where
        R: RangeBounds<Grade>,
    {
        // BTreeMap::range panics on inverted bounds
        if is_inverted(&grades) {
            return Vec::new();
        }

        match self.courses.get(course) {
            Some(buckets) => buckets
                .range(grades)
                .flat_map(|(_, bucket)| bucket.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of records holding exactly `grade` in `course`
    pub fn count_exact(&self, course: &C, grade: Grade) -> usize {
        self.courses
            .get(course)
            .and_then(|buckets| buckets.get(&grade))
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    /// Indexed courses, ascending
    pub fn courses(&self) -> impl Iterator<Item = &'a C> + '_ {
        self.courses.keys().copied()
    }

    /// Distinct grades recorded for `course`, ascending
    pub fn grades(&self, course: &C) -> Vec<Grade> {
        self.courses
            .get(course)
            .map(|buckets| buckets.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn has_course(&self, course: &C) -> bool {
        self.courses.contains_key(course)
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records_indexed: self.records,
            courses: self.courses.len(),
            grade_buckets: self.courses.values().map(|buckets| buckets.len()).sum(),
            entries: self.entries,
        }
    }
}

fn is_inverted(range: &impl RangeBounds<Grade>) -> bool {
    match (range.start_bound(), range.end_bound()) {
        (Bound::Included(s) | Bound::Excluded(s), Bound::Included(e) | Bound::Excluded(e))
            if s > e =>
        {
            true
        }
        (Bound::Excluded(s), Bound::Excluded(e)) => s == e,
        _ => false,
    }
}
