//! Delimited Import
//!
//! Line-oriented import of student and course files. Fields are split on a
//! single-byte delimiter with no quoting or escaping, and surrounding
//! whitespace is trimmed.

use super::IngestResult;
use crate::record::{CourseId, Grade, Record};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Skip reasons kept per import; the rest are only counted
const MAX_REPORTED_ERRORS: usize = 100;

/// Importer for delimited student and course files
#[derive(Debug, Clone)]
pub struct DelimitedImporter {
    /// Field separator
    delimiter: u8,
}

/// Result of reading a student file
#[derive(Debug)]
pub struct StudentImportResult<Id> {
    /// Records built from valid lines, in file order
    pub records: Vec<Record<Id>>,
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub errors: Vec<String>,
}

/// Result of applying a course file to loaded records
#[derive(Debug, Default)]
pub struct CourseImportResult {
    /// Active enrollments appended
    pub enrollments: usize,
    /// Completed-course grades recorded
    pub grades: usize,
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub errors: Vec<String>,
}

/// One valid course-file line
enum CourseLine<Id> {
    Enrollment(Id, CourseId),
    Completed(Id, CourseId, Grade),
}

impl Default for DelimitedImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimitedImporter {
    /// Create an importer splitting on commas
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn reader<R: Read>(&self, input: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .quoting(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input)
    }

    /// Import a student file
    ///
    /// Fails only when the file cannot be opened; bad lines are skipped.
    pub fn import_students<Id: FromStr>(
        &self,
        path: &Path,
    ) -> IngestResult<StudentImportResult<Id>> {
        let file = File::open(path)?;
        let result = self.read_students(file);

        tracing::info!(
            "Loaded {} records from {:?} ({} lines skipped)",
            result.records.len(),
            path,
            result.lines_skipped
        );

        Ok(result)
    }

    /// Import students from a string (useful for testing)
    pub fn import_students_str<Id: FromStr>(&self, data: &str) -> StudentImportResult<Id> {
        self.read_students(data.as_bytes())
    }

    /// Read student lines from any reader
    pub fn read_students<Id: FromStr, R: Read>(&self, input: R) -> StudentImportResult<Id> {
        let mut reader = self.reader(input);

        let mut records = Vec::new();
        let mut lines_read = 0;
        let mut lines_skipped = 0;
        let mut errors = Vec::new();

        for result in reader.records() {
            if matches!(&result, Ok(row) if is_blank(row)) {
                continue;
            }
            lines_read += 1;

            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|row| parse_student(&row).map_err(|e| line_error(&row, e)));

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!("Skipping student line: {}", e);
                    errors.push(e);
                    lines_skipped += 1;
                }
            }
        }

        truncate_errors(&mut errors);

        StudentImportResult {
            records,
            lines_read,
            lines_skipped,
            errors,
        }
    }

    /// Apply a course file to already loaded records
    pub fn import_courses<Id: Ord + FromStr>(
        &self,
        path: &Path,
        records: &mut [Record<Id>],
    ) -> IngestResult<CourseImportResult> {
        let file = File::open(path)?;
        let result = self.read_courses(file, records);

        tracing::info!(
            "Applied {} enrollments and {} grades from {:?} ({} lines skipped)",
            result.enrollments,
            result.grades,
            path,
            result.lines_skipped
        );

        Ok(result)
    }

    /// Apply course lines from a string (useful for testing)
    pub fn import_courses_str<Id: Ord + FromStr>(
        &self,
        data: &str,
        records: &mut [Record<Id>],
    ) -> CourseImportResult {
        self.read_courses(data.as_bytes(), records)
    }

    /// Apply course lines from any reader
    ///
    /// A line is matched to the first record carrying its identifier. Lines
    /// naming an identifier that no record has are skipped.
    pub fn read_courses<Id: Ord + FromStr, R: Read>(
        &self,
        input: R,
        records: &mut [Record<Id>],
    ) -> CourseImportResult {
        // Record positions ordered by identifier; the stable sort keeps the
        // first occurrence of a duplicated identifier in front.
        let mut by_id: Vec<usize> = (0..records.len()).collect();
        by_id.sort_by(|&a, &b| records[a].id().cmp(records[b].id()));

        let mut reader = self.reader(input);
        let mut result = CourseImportResult::default();

        for row in reader.records() {
            if matches!(&row, Ok(row) if is_blank(row)) {
                continue;
            }
            result.lines_read += 1;

            let parsed = row.map_err(|e| e.to_string()).and_then(|row| {
                let line = parse_course::<Id>(&row).map_err(|e| line_error(&row, e))?;
                let id = match &line {
                    CourseLine::Enrollment(id, _) | CourseLine::Completed(id, _, _) => id,
                };

                let at = by_id.partition_point(|&pos| records[pos].id() < id);
                match by_id.get(at) {
                    Some(&pos) if records[pos].id() == id => Ok((pos, line)),
                    _ => Err(line_error(&row, format!("unknown identifier '{}'", &row[0]))),
                }
            });

            match parsed {
                Ok((pos, CourseLine::Enrollment(_, course))) => {
                    records[pos].add_current_course(course);
                    result.enrollments += 1;
                }
                Ok((pos, CourseLine::Completed(_, course, grade))) => {
                    records[pos].add_previous_course(course, grade);
                    result.grades += 1;
                }
                Err(e) => {
                    tracing::debug!("Skipping course line: {}", e);
                    result.errors.push(e);
                    result.lines_skipped += 1;
                }
            }
        }

        truncate_errors(&mut result.errors);
        result
    }
}

fn parse_student<Id: FromStr>(row: &csv::StringRecord) -> Result<Record<Id>, String> {
    if row.len() != 4 {
        return Err(format!("expected 4 fields, found {}", row.len()));
    }

    if row[1].is_empty() {
        return Err("empty identifier".to_string());
    }

    let id = row[1]
        .parse::<Id>()
        .map_err(|_| format!("invalid identifier '{}'", &row[1]))?;
    let year = row[3]
        .parse::<i32>()
        .map_err(|_| format!("invalid year '{}'", &row[3]))?;

    Ok(Record::new(&row[0], id, &row[2], year))
}

fn parse_course<Id: FromStr>(row: &csv::StringRecord) -> Result<CourseLine<Id>, String> {
    if row.len() != 2 && row.len() != 3 {
        return Err(format!("expected 2 or 3 fields, found {}", row.len()));
    }

    let id = row[0]
        .parse::<Id>()
        .map_err(|_| format!("invalid identifier '{}'", &row[0]))?;
    let course = CourseId::parse(&row[1]).ok_or_else(|| "empty course".to_string())?;

    match row.get(2) {
        None => Ok(CourseLine::Enrollment(id, course)),
        Some(field) => {
            let grade = field
                .parse::<Grade>()
                .map_err(|_| format!("invalid grade '{}'", field))?;
            Ok(CourseLine::Completed(id, course, grade))
        }
    }
}

/// Whitespace-only lines trim down to nothing but empty fields
fn is_blank(row: &csv::StringRecord) -> bool {
    row.iter().all(str::is_empty)
}

fn line_error(row: &csv::StringRecord, reason: String) -> String {
    match row.position() {
        Some(pos) => format!("Line {}: {}", pos.line(), reason),
        None => reason,
    }
}

fn truncate_errors(errors: &mut Vec<String>) {
    if errors.len() > MAX_REPORTED_ERRORS {
        let total = errors.len();
        errors.truncate(MAX_REPORTED_ERRORS);
        errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestError;
    use tempfile::tempdir;

    #[test]
    fn test_student_import() {
        let data = "Alice Smith,2025001,Computer Science,2025
Bob Johnson,2025002,Electronics,2024
";
        let result: StudentImportResult<u64> = DelimitedImporter::new().import_students_str(data);

        assert_eq!(result.lines_read, 2);
        assert_eq!(result.lines_skipped, 0);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].name(), "Alice Smith");
        assert_eq!(*result.records[0].id(), 2025001);
        assert_eq!(result.records[1].category(), "Electronics");
        assert_eq!(result.records[1].year(), 2024);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let data = "Alice,1,CS,2025
too,few,fields
Bob,2,EE,twenty
Carol,3,ME,2023,extra
Dan,notanumber,CS,2022
Eve,5,CS,2021
";
        let result: StudentImportResult<u64> = DelimitedImporter::new().import_students_str(data);

        let ids: Vec<u64> = result.records.iter().map(|r| *r.id()).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(result.lines_read, 6);
        assert_eq!(result.lines_skipped, 4);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].starts_with("Line 2:"));
        assert!(result.errors[1].contains("invalid year 'twenty'"));
    }

    #[test]
    fn test_text_identifiers() {
        let data = "Bob Johnson,MT-CS-2025-002,Electronics,2025\n";
        let result: StudentImportResult<String> = DelimitedImporter::new().import_students_str(data);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].id(), "MT-CS-2025-002");
    }

    #[test]
    fn test_custom_delimiter_and_no_quoting() {
        let data = "O\"Brien, Pat|7|CS|2020\n";
        let result: StudentImportResult<u64> = DelimitedImporter::new()
            .with_delimiter(b'|')
            .import_students_str(data);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name(), "O\"Brien, Pat");
    }

    #[test]
    fn test_blank_lines_ignored() {
        let data = "Alice,1,CS,2025\n\n\nBob,2,EE,2024\n";
        let result: StudentImportResult<u64> = DelimitedImporter::new().import_students_str(data);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.lines_skipped, 0);
    }

    #[test]
    fn test_whitespace_only_lines_ignored() {
        let data = "Alice,1,CS,2025\n   \n\t\n , , , \nBob,2,EE,2024\n";
        let result: StudentImportResult<u64> = DelimitedImporter::new().import_students_str(data);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.lines_read, 2);
        assert_eq!(result.lines_skipped, 0);
        assert!(result.errors.is_empty());

        let mut records = result.records;
        let applied = DelimitedImporter::new().import_courses_str("1,M,9\n  \n\t\n2,M,7\n", &mut records);
        assert_eq!(applied.grades, 2);
        assert_eq!(applied.lines_skipped, 0);
    }

    #[test]
    fn test_empty_input() {
        let result: StudentImportResult<u64> = DelimitedImporter::new().import_students_str("");
        assert!(result.records.is_empty());
        assert_eq!(result.lines_read, 0);
    }

    #[test]
    fn test_course_import() {
        let mut records: Vec<Record<u64>> = DelimitedImporter::new()
            .import_students_str("Alice,1,CS,2025\nBob,2,EE,2024\n")
            .records;

        let courses = "1,OOPD
1,DSA,8
1,DSA,9
2,501,6
2,501
3,DSA,7
1,,5
2,DSA,A
1
";
        let result = DelimitedImporter::new().import_courses_str(courses, &mut records);

        assert_eq!(result.lines_read, 9);
        assert_eq!(result.enrollments, 2);
        assert_eq!(result.grades, 3);
        assert_eq!(result.lines_skipped, 4);

        assert_eq!(records[0].current_courses(), &[CourseId::from("OOPD")]);
        assert_eq!(records[0].grade_for(&CourseId::from("DSA")), Some(9));
        assert_eq!(records[1].grade_for(&CourseId::Numeric(501)), Some(6));
        assert_eq!(records[1].current_courses(), &[CourseId::Numeric(501)]);
        assert!(result.errors.iter().any(|e| e.contains("unknown identifier '3'")));
    }

    #[test]
    fn test_course_import_unsorted_and_duplicate_ids() {
        let mut records: Vec<Record<u64>> = vec![
            Record::new("first", 9, "CS", 2025),
            Record::new("other", 1, "CS", 2025),
            Record::new("second", 9, "CS", 2025),
        ];

        let result = DelimitedImporter::new().import_courses_str("9,M,7\n1,M,3\n", &mut records);

        assert_eq!(result.grades, 2);
        assert_eq!(records[0].grade_for(&CourseId::from("M")), Some(7));
        assert_eq!(records[1].grade_for(&CourseId::from("M")), Some(3));
        assert!(records[2].previous_courses().is_empty());
    }

    #[test]
    fn test_import_from_files() {
        let dir = tempdir().unwrap();
        let students = dir.path().join("students.csv");
        let courses = dir.path().join("courses.csv");
        std::fs::write(&students, "Alice,1,CS,2025\nBob,2,EE,2024\n").unwrap();
        std::fs::write(&courses, "1,M,9\n2,M,7\n").unwrap();

        let importer = DelimitedImporter::new();
        let mut loaded: StudentImportResult<u64> = importer.import_students(&students).unwrap();
        let applied = importer.import_courses(&courses, &mut loaded.records).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(applied.grades, 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = DelimitedImporter::new().import_students::<u64>(&dir.path().join("missing.csv"));

        assert!(matches!(result, Err(IngestError::Io(_))));
    }

    #[test]
    fn test_error_list_truncated() {
        let data = "bad line\n".repeat(150);
        let result: StudentImportResult<u64> = DelimitedImporter::new().import_students_str(&data);

        assert_eq!(result.lines_skipped, 150);
        assert_eq!(result.errors.len(), MAX_REPORTED_ERRORS + 1);
        assert_eq!(result.errors.last().unwrap(), "... and 50 more errors");
    }
}
