//! Core data types for the student catalog
//!
//! - `CourseId`: course identifier issued by either a text-code or a
//!   numeric-code authority
//! - `Record`: one student entry, ordered by identifier only
//! - `Grade`: integer grade stored in the completed-work map

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Grade earned in a completed course
pub type Grade = u32;

/// Course identifier
///
/// Different authorities issue courses as text acronyms ("DSA") or integer
/// codes (701), and a single catalog can hold both. The derived order compares
/// the variant first (`Text` before `Numeric`) and the payload second, which
/// keeps the type usable as an ordered-map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseId {
    /// Acronym-style course code
    Text(String),
    /// Integer course code
    Numeric(u32),
}

impl CourseId {
    /// Parse a course from an input field
    ///
    /// Fields that parse as `u32` become `Numeric`, any other non-empty field
    /// becomes `Text`. Surrounding whitespace is ignored.
    pub fn parse(field: &str) -> Option<Self> {
        let field = field.trim();
        if field.is_empty() {
            return None;
        }

        Some(match field.parse::<u32>() {
            Ok(code) => CourseId::Numeric(code),
            Err(_) => CourseId::Text(field.to_string()),
        })
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseId::Text(code) => write!(f, "{}", code),
            CourseId::Numeric(code) => write!(f, "{}", code),
        }
    }
}

/// Always `Text`, digit strings included; [`CourseId::parse`] applies the
/// input-file rule instead.
impl From<&str> for CourseId {
    fn from(code: &str) -> Self {
        CourseId::Text(code.to_string())
    }
}

/// Always `Text`, like `From<&str>`
impl From<String> for CourseId {
    fn from(code: String) -> Self {
        CourseId::Text(code)
    }
}

impl From<u32> for CourseId {
    fn from(code: u32) -> Self {
        CourseId::Numeric(code)
    }
}

/// A single student record
///
/// Generic over the identifier type (`u64` roll numbers, `String` registration
/// codes, ...) and the course type. Equality and ordering look at the
/// identifier only: two records with the same identifier are order-equivalent
/// whatever their other fields hold.
#[derive(Debug, Clone)]
pub struct Record<Id, C = CourseId> {
    /// Display name
    name: String,
    /// Identifier, the sole ordering key
    id: Id,
    /// Category label (branch, programme, ...)
    category: String,
    /// Year the student started
    year: i32,
    /// Courses currently being taken, in enrollment order
    current_courses: Vec<C>,
    /// Completed courses and the grade earned in each
    previous_courses: BTreeMap<C, Grade>,
}

impl<Id, C> Record<Id, C> {
    /// Create a record with no enrollments or grades
    pub fn new(name: impl Into<String>, id: Id, category: impl Into<String>, year: i32) -> Self {
        Self {
            name: name.into(),
            id,
            category: category.into(),
            year,
            current_courses: Vec::new(),
            previous_courses: BTreeMap::new(),
        }
    }

    /// Append a course to the active-enrollment list (duplicates allowed)
    pub fn add_current_course(&mut self, course: impl Into<C>) {
        self.current_courses.push(course.into());
    }

    /// Builder method: append an active course
    pub fn current_course(mut self, course: impl Into<C>) -> Self {
        self.add_current_course(course);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn current_courses(&self) -> &[C] {
        &self.current_courses
    }

    pub fn previous_courses(&self) -> &BTreeMap<C, Grade> {
        &self.previous_courses
    }
}

impl<Id, C: Ord> Record<Id, C> {
    /// Record a completed course; a repeated course overwrites the old grade
    pub fn add_previous_course(&mut self, course: impl Into<C>, grade: Grade) {
        self.previous_courses.insert(course.into(), grade);
    }

    /// Builder method: add a completed course
    pub fn grade(mut self, course: impl Into<C>, grade: Grade) -> Self {
        self.add_previous_course(course, grade);
        self
    }

    /// Grade earned in `course`, if completed
    pub fn grade_for(&self, course: &C) -> Option<Grade> {
        self.previous_courses.get(course).copied()
    }
}

impl<Id: Ord, C> PartialEq for Record<Id, C> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Id: Ord, C> Eq for Record<Id, C> {}

impl<Id: Ord, C> PartialOrd for Record<Id, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Id: Ord, C> Ord for Record<Id, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
