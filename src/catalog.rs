//! Catalog - owner of the loaded records
//!
//! Ties the pipeline together:
//!
//! ```text
//! students.csv ─┐
//! courses.csv  ─┴→ DelimitedImporter → Catalog (Vec<Record>)
//!                                         ├→ sorted_view()  → Vec<&Record>, sorted by id
//!                                         └→ grade_index()  → GradeIndex<'_>
//! ```
//!
//! Views and indexes borrow the catalog, so the records cannot be mutated or
//! dropped while either is alive.

use crate::index::GradeIndex;
use crate::ingest::{DelimitedImporter, IngestResult};
use crate::record::{CourseId, Record};
use crate::sort::{ParallelSorter, SortResult, SortStats};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// Owned collection of student records
#[derive(Debug, Clone)]
pub struct Catalog<Id, C = CourseId> {
    records: Vec<Record<Id, C>>,
}

/// Records sorted by identifier, borrowed from a catalog
#[derive(Debug)]
pub struct SortedView<'a, Id, C = CourseId> {
    pub records: Vec<&'a Record<Id, C>>,
    pub stats: SortStats,
}

/// Counts from loading a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Records loaded from the student file
    pub records: usize,
    /// Student lines skipped as malformed
    pub student_lines_skipped: usize,
    /// Active enrollments applied from the course file
    pub enrollments: usize,
    /// Completed grades applied from the course file
    pub grades: usize,
    /// Course lines skipped as malformed or unmatched
    pub course_lines_skipped: usize,
}

impl<Id, C> Default for Catalog<Id, C> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<Id, C> Catalog<Id, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record<Id, C>>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record<Id, C>] {
        &self.records
    }

    /// Mutable access for appending enrollments and grades during ingestion
    pub fn records_mut(&mut self) -> &mut [Record<Id, C>] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// References to every record, in load order
    pub fn view(&self) -> Vec<&Record<Id, C>> {
        self.records.iter().collect()
    }

    /// Records sorted by identifier using `sorter`'s worker threads
    pub fn sorted_view(&self, sorter: &ParallelSorter) -> SortResult<SortedView<'_, Id, C>>
    where
        Id: Ord + Sync,
        C: Sync,
    {
        let mut records = self.view();
        let stats = sorter.sort(&mut records)?;
        Ok(SortedView { records, stats })
    }

    /// Build the (course, grade) index over the records
    pub fn grade_index(&self) -> GradeIndex<'_, Id, C>
    where
        C: Ord,
    {
        GradeIndex::build(&self.records)
    }
}

impl<Id: Ord + FromStr> Catalog<Id> {
    /// Load a student file and, optionally, a course file
    pub fn load(
        importer: &DelimitedImporter,
        students: &Path,
        courses: Option<&Path>,
    ) -> IngestResult<(Self, LoadSummary)> {
        let imported = importer.import_students::<Id>(students)?;

        let mut catalog = Self::from_records(imported.records);
        let mut summary = LoadSummary {
            records: catalog.len(),
            student_lines_skipped: imported.lines_skipped,
            ..Default::default()
        };

        if let Some(path) = courses {
            let applied = importer.import_courses(path, catalog.records_mut())?;
            summary.enrollments = applied.enrollments;
            summary.grades = applied.grades;
            summary.course_lines_skipped = applied.lines_skipped;
        }

        Ok((catalog, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn scenario() -> Catalog<u64> {
        Catalog::from_records(vec![
            Record::new("A", 5, "CS", 2025).grade("M", 9),
            Record::new("B", 2, "CS", 2025).grade("M", 7),
            Record::new("C", 8, "EE", 2024).grade(701u32, 9),
        ])
    }

    fn names(records: &[&Record<u64>]) -> Vec<String> {
        records.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn test_scenario_sort_and_query() {
        let catalog = scenario();

        let sorted = catalog.sorted_view(&ParallelSorter::new(2)).unwrap();
        assert_eq!(names(&sorted.records), vec!["B", "A", "C"]);

        let index = catalog.grade_index();
        assert_eq!(names(&index.find(&CourseId::from("M"), 8)), vec!["A"]);
        assert_eq!(names(&index.find(&CourseId::from(701u32), 9)), vec!["C"]);
        assert!(index.find(&CourseId::from("X"), 0).is_empty());

        // Load order is untouched by the sort
        assert_eq!(names(&catalog.view()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sort_and_index_share_records() {
        let catalog = scenario();
        let sorted = catalog.sorted_view(&ParallelSorter::new(2)).unwrap();
        let index = catalog.grade_index();

        let from_index = index.find(&CourseId::from(701u32), 0)[0];
        let from_sort = sorted.records[2];
        assert!(std::ptr::eq(from_index, from_sort));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog: Catalog<u64> = Catalog::new();

        let sorted = catalog.sorted_view(&ParallelSorter::new(2)).unwrap();
        assert!(sorted.records.is_empty());
        assert_eq!(sorted.stats.workers, 0);

        let index = catalog.grade_index();
        assert!(index.is_empty());
        assert!(index.find(&CourseId::from("M"), 0).is_empty());
    }

    #[test]
    fn test_load_with_courses() {
        let dir = tempdir().unwrap();
        let students = dir.path().join("students.csv");
        let courses = dir.path().join("courses.csv");
        std::fs::write(&students, "A,5,CS,2025\nB,2,CS,2025\nC,8,EE,2024\nbroken line\n").unwrap();
        std::fs::write(&courses, "5,M,9\n2,M,7\n8,701,9\n8,OOPD\n4,M,1\n").unwrap();

        let (catalog, summary) =
            Catalog::<u64>::load(&DelimitedImporter::new(), &students, Some(&courses)).unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                records: 3,
                student_lines_skipped: 1,
                enrollments: 1,
                grades: 3,
                course_lines_skipped: 1,
            }
        );

        let index = catalog.grade_index();
        assert_eq!(names(&index.find(&CourseId::from("M"), 8)), vec!["A"]);
        assert_eq!(catalog.records()[2].current_courses(), &[CourseId::from("OOPD")]);
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempdir().unwrap();
        let students = dir.path().join("students.csv");
        std::fs::write(&students, "").unwrap();

        let (catalog, summary) =
            Catalog::<String>::load(&DelimitedImporter::new(), &students, None).unwrap();

        assert!(catalog.is_empty());
        assert_eq!(summary.records, 0);
    }
}
