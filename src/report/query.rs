//! `COURSE:GRADE` query parsing

use crate::record::{CourseId, Grade};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// "Records with a grade of at least `min_grade` in `course`"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeQuery<C = CourseId> {
    pub course: C,
    pub min_grade: Grade,
}

impl<C> GradeQuery<C> {
    pub fn new(course: impl Into<C>, min_grade: Grade) -> Self {
        Self {
            course: course.into(),
            min_grade,
        }
    }
}

impl<C: fmt::Display> fmt::Display for GradeQuery<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} >= {}", self.course, self.min_grade)
    }
}

/// Errors from parsing a `COURSE:GRADE` query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("Expected COURSE:GRADE, got '{0}'")]
    MissingSeparator(String),

    #[error("Empty course in query '{0}'")]
    EmptyCourse(String),

    #[error("Invalid grade '{grade}' in query '{query}'")]
    InvalidGrade { query: String, grade: String },
}

impl FromStr for GradeQuery {
    type Err = QueryParseError;

    /// The last `:` separates the grade, so course names may contain colons
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (course, grade) = s
            .rsplit_once(':')
            .ok_or_else(|| QueryParseError::MissingSeparator(s.to_string()))?;

        let course =
            CourseId::parse(course).ok_or_else(|| QueryParseError::EmptyCourse(s.to_string()))?;

        let grade = grade.trim();
        let min_grade = grade
            .parse::<Grade>()
            .map_err(|_| QueryParseError::InvalidGrade {
                query: s.to_string(),
                grade: grade.to_string(),
            })?;

        Ok(Self { course, min_grade })
    }
}
