//! Report rendering
//!
//! Read-only formatting of records, query matches and engine statistics.
//! Every renderer takes `R: Borrow<Record<Id, C>>`, so a `Vec<Record>`, a
//! sorted `Vec<&Record>` or index matches all render the same way.
//!
//! ```text
//! table  padded columns for the terminal
//! json   one pretty-printed document per call (serde_json)
//! csv    header + one row per record (csv writer)
//! ```

mod query;

pub use query::{GradeQuery, QueryParseError};

use crate::index::IndexStats;
use crate::record::{CourseId, Grade, Record};
use crate::sort::SortStats;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display};
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Table => write!(f, "table"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

/// Structured form of a record for JSON output
///
/// Courses keep their own serialized form, so `Text("7")` and `Numeric(7)`
/// stay distinct (`"7"` vs `7`).
#[derive(Debug, Serialize)]
struct RecordRow<'r, C> {
    name: &'r str,
    id: String,
    category: &'r str,
    year: i32,
    current_courses: &'r [C],
    previous_courses: Vec<CompletedCourse<'r, C>>,
}

#[derive(Debug, Serialize)]
struct CompletedCourse<'r, C> {
    course: &'r C,
    grade: Grade,
}

impl<'r, C> RecordRow<'r, C> {
    fn new<Id: Display>(record: &'r Record<Id, C>) -> Self {
        Self {
            name: record.name(),
            id: record.id().to_string(),
            category: record.category(),
            year: record.year(),
            current_courses: record.current_courses(),
            previous_courses: record
                .previous_courses()
                .iter()
                .map(|(course, grade)| CompletedCourse {
                    course,
                    grade: *grade,
                })
                .collect(),
        }
    }
}

/// Flat form of a record for table and CSV output; list fields are `;`-joined
#[derive(Debug, Serialize)]
struct FlatRecordRow<'r> {
    name: &'r str,
    id: String,
    category: &'r str,
    year: i32,
    current_courses: String,
    previous_courses: String,
}

impl<'r> FlatRecordRow<'r> {
    fn new<Id: Display, C: Display>(record: &'r Record<Id, C>) -> Self {
        Self {
            name: record.name(),
            id: record.id().to_string(),
            category: record.category(),
            year: record.year(),
            current_courses: record
                .current_courses()
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            previous_courses: record
                .previous_courses()
                .iter()
                .map(|(c, g)| format!("{}={}", c, g))
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// One query match: the record and its grade in the queried course
#[derive(Debug, Serialize)]
struct MatchRow<'r> {
    name: &'r str,
    id: String,
    category: &'r str,
    year: i32,
    grade: Option<Grade>,
}

#[derive(Serialize)]
struct RecordsDocument<'r, 't, C> {
    title: &'t str,
    count: usize,
    records: Vec<RecordRow<'r, C>>,
}

#[derive(Serialize)]
struct MatchesDocument<'r, 'q, C> {
    course: &'q C,
    min_grade: Grade,
    count: usize,
    matches: Vec<MatchRow<'r>>,
}

/// Render a listing of records
pub fn render_records<W, Id, C, R>(
    writer: &mut W,
    format: ReportFormat,
    title: &str,
    records: &[R],
) -> ReportResult<()>
where
    W: Write,
    Id: Display,
    C: Display + Serialize,
    R: Borrow<Record<Id, C>>,
{
    let records: Vec<&Record<Id, C>> = records
        .iter()
        .map(|r| {
            let record: &Record<Id, C> = r.borrow();
            record
        })
        .collect();

    match format {
        ReportFormat::Table => {
            writeln!(writer, "{} ({} records)", title, records.len())?;
            if records.is_empty() {
                writeln!(writer, "  (none)")?;
                return Ok(());
            }
            writeln!(
                writer,
                "{:<20} {:<12} {:<10} {:<6} {:<20} {}",
                "Name", "Id", "Category", "Year", "Current", "Grades"
            )?;
            writeln!(writer, "{}", "-".repeat(90))?;
            for record in records {
                let row = FlatRecordRow::new(record);
                writeln!(
                    writer,
                    "{:<20} {:<12} {:<10} {:<6} {:<20} {}",
                    row.name,
                    row.id,
                    row.category,
                    row.year,
                    row.current_courses,
                    row.previous_courses
                )?;
            }
        }
        ReportFormat::Json => {
            let doc = RecordsDocument {
                title,
                count: records.len(),
                records: records.into_iter().map(RecordRow::new).collect(),
            };
            serde_json::to_writer_pretty(&mut *writer, &doc)?;
            writeln!(writer)?;
        }
        ReportFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(&mut *writer);
            for record in records {
                csv_writer.serialize(FlatRecordRow::new(record))?;
            }
            csv_writer.flush()?;
        }
    }

    Ok(())
}

/// Render the matches of one grade query
pub fn render_matches<W, Id, C, R>(
    writer: &mut W,
    format: ReportFormat,
    query: &GradeQuery<C>,
    matches: &[R],
) -> ReportResult<()>
where
    W: Write,
    Id: Display,
    C: Display + Ord + Serialize,
    R: Borrow<Record<Id, C>>,
{
    let rows: Vec<MatchRow<'_>> = matches
        .iter()
        .map(|r| {
            let record: &Record<Id, C> = r.borrow();
            MatchRow {
                name: record.name(),
                id: record.id().to_string(),
                category: record.category(),
                year: record.year(),
                grade: record.grade_for(&query.course),
            }
        })
        .collect();

    match format {
        ReportFormat::Table => {
            writeln!(writer, "Query {} ({} matches)", query, rows.len())?;
            if rows.is_empty() {
                writeln!(writer, "  (none)")?;
                return Ok(());
            }
            writeln!(
                writer,
                "{:<20} {:<12} {:<10} {:<6} {}",
                "Name", "Id", "Category", "Year", "Grade"
            )?;
            writeln!(writer, "{}", "-".repeat(56))?;
            for row in rows {
                writeln!(
                    writer,
                    "{:<20} {:<12} {:<10} {:<6} {}",
                    row.name,
                    row.id,
                    row.category,
                    row.year,
                    row.grade.map(|g| g.to_string()).unwrap_or_default()
                )?;
            }
        }
        ReportFormat::Json => {
            let doc = MatchesDocument {
                course: &query.course,
                min_grade: query.min_grade,
                count: rows.len(),
                matches: rows,
            };
            serde_json::to_writer_pretty(&mut *writer, &doc)?;
            writeln!(writer)?;
        }
        ReportFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(&mut *writer);
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
    }

    Ok(())
}

/// One summary line per sort call, plus per-worker timing
pub fn render_sort_stats<W: Write>(writer: &mut W, stats: &SortStats) -> ReportResult<()> {
    writeln!(writer, "Sort: {}", stats)?;
    for (worker, (size, time)) in stats
        .chunk_sizes
        .iter()
        .zip(stats.worker_times.iter())
        .enumerate()
    {
        writeln!(writer, "  worker {}: {} records in {:?}", worker, size, time)?;
    }
    Ok(())
}

pub fn render_index_stats<W: Write>(writer: &mut W, stats: &IndexStats) -> ReportResult<()> {
    writeln!(writer, "Index: {}", stats)?;
    Ok(())
}

/// Convenience for the common `CourseId` case
pub fn parse_queries<'s, I>(queries: I) -> Result<Vec<GradeQuery<CourseId>>, QueryParseError>
where
    I: IntoIterator<Item = &'s str>,
{
    queries.into_iter().map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record<u64>> {
        vec![
            Record::new("Asha", 5, "CSE", 2025)
                .grade("M", 9)
                .current_course("DSA"),
            Record::new("Bilal", 2, "CSE", 2025).grade("M", 7),
            Record::new("Chen", 8, "ECE", 2024)
                .grade(701u32, 9)
                .grade("M", 8),
        ]
    }

    fn render_both(format: ReportFormat) -> (String, String) {
        let owned = records();
        let borrowed: Vec<&Record<u64>> = owned.iter().collect();

        let mut from_owned = Vec::new();
        render_records(&mut from_owned, format, "Students", &owned).unwrap();
        let mut from_borrowed = Vec::new();
        render_records(&mut from_borrowed, format, "Students", &borrowed).unwrap();

        (
            String::from_utf8(from_owned).unwrap(),
            String::from_utf8(from_borrowed).unwrap(),
        )
    }

    #[test]
    fn test_owned_and_borrowed_render_identically() {
        for format in [ReportFormat::Table, ReportFormat::Json, ReportFormat::Csv] {
            let (owned, borrowed) = render_both(format);
            assert_eq!(owned, borrowed, "format {}", format);
            assert!(!owned.is_empty());
        }
    }

    #[test]
    fn test_table_listing() {
        let (table, _) = render_both(ReportFormat::Table);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Students (3 records)");
        assert!(lines[1].starts_with("Name"));
        assert!(lines[3].starts_with("Asha"));
        assert!(lines[3].contains("DSA"));
        assert!(lines[3].ends_with("M=9"));
        assert!(lines[5].starts_with("Chen"));
        assert!(lines[5].ends_with("M=8;701=9"));
    }

    #[test]
    fn test_json_listing() {
        let (json, _) = render_both(ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "Students");
        assert_eq!(value["count"], 3);
        assert_eq!(value["records"][0]["name"], "Asha");
        assert_eq!(value["records"][0]["id"], "5");
        assert_eq!(value["records"][0]["current_courses"][0], "DSA");
        assert_eq!(value["records"][2]["previous_courses"][0]["course"], "M");
        assert_eq!(value["records"][2]["previous_courses"][1]["course"], 701);
        assert_eq!(value["records"][2]["previous_courses"][1]["grade"], 9);
    }

    #[test]
    fn test_json_keeps_text_and_numeric_courses_apart() {
        let owned: Vec<Record<u64>> = vec![Record::new("Xu", 1, "CSE", 2025)
            .grade(CourseId::Text("7".into()), 5)
            .grade(7u32, 9)];
        assert_eq!(owned[0].previous_courses().len(), 2);

        let mut out = Vec::new();
        render_records(&mut out, ReportFormat::Json, "Students", &owned).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let completed = value["records"][0]["previous_courses"].as_array().unwrap();
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0]["course"], "7");
        assert_eq!(completed[0]["grade"], 5);
        assert_eq!(completed[1]["course"], 7);
        assert_eq!(completed[1]["grade"], 9);
    }

    #[test]
    fn test_json_match_course_keeps_its_kind() {
        let owned: Vec<Record<u64>> = vec![Record::new("Xu", 1, "CSE", 2025).grade(7u32, 9)];
        let query: GradeQuery = "7:8".parse().unwrap();

        let mut out = Vec::new();
        render_matches(&mut out, ReportFormat::Json, &query, &owned).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["course"], 7);
        assert_eq!(value["matches"][0]["grade"], 9);
    }

    #[test]
    fn test_csv_listing() {
        let (csv, _) = render_both(ReportFormat::Csv);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,id,category,year,current_courses,previous_courses");
        assert_eq!(lines[1], "Asha,5,CSE,2025,DSA,M=9");
        assert_eq!(lines[3], "Chen,8,ECE,2024,,M=8;701=9");
    }

    #[test]
    fn test_empty_listing() {
        let empty: Vec<Record<u64>> = Vec::new();
        let mut out = Vec::new();
        render_records(&mut out, ReportFormat::Table, "Before sort", &empty).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Before sort (0 records)\n  (none)\n"
        );
    }

    #[test]
    fn test_matches_show_queried_grade() {
        let owned = records();
        let matches: Vec<&Record<u64>> = vec![&owned[2], &owned[0]];
        let query: GradeQuery = "M:8".parse().unwrap();

        let mut out = Vec::new();
        render_matches(&mut out, ReportFormat::Csv, &query, &matches).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,id,category,year,grade");
        assert_eq!(lines[1], "Chen,8,ECE,2024,8");
        assert_eq!(lines[2], "Asha,5,CSE,2025,9");

        let mut out = Vec::new();
        render_matches(&mut out, ReportFormat::Json, &query, &matches).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["course"], "M");
        assert_eq!(value["min_grade"], 8);
        assert_eq!(value["matches"][1]["grade"], 9);
    }

    #[test]
    fn test_no_matches() {
        let matches: Vec<&Record<u64>> = Vec::new();
        let query: GradeQuery = "X:0".parse().unwrap();

        let mut out = Vec::new();
        render_matches(&mut out, ReportFormat::Table, &query, &matches).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Query X >= 0 (0 matches)\n  (none)\n"
        );
    }

    #[test]
    fn test_stats_lines() {
        let stats = SortStats {
            items: 5,
            workers: 2,
            chunk_sizes: vec![3, 2],
            worker_times: vec![std::time::Duration::ZERO; 2],
            ..Default::default()
        };
        let mut out = Vec::new();
        render_sort_stats(&mut out, &stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("worker 1: 2 records"));

        let mut out = Vec::new();
        render_index_stats(&mut out, &IndexStats::default()).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Index: 0 records"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert!("xml".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::default(), ReportFormat::Table);
    }

    #[test]
    fn test_parse_queries() {
        let queries = parse_queries(["DSA:8", "701:9"]).unwrap();
        assert_eq!(queries.len(), 2);
        assert!(parse_queries(["DSA"]).is_err());
    }
}
