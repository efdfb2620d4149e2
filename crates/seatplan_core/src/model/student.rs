//! Student domain model.
//!
//! # Responsibility
//! - Define the roster record shared by seat map and constraint store.
//! - Own name normalization and validation rules used by every add/edit path.
//!
//! # Invariants
//! - `id` is stable and never reused for another student.
//! - `name` is trimmed, non-empty and at most `MAX_NAME_CHARS` characters.
//! - Names are unique within one roster (case-sensitive exact match); the
//!   roster owner enforces this, not the record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum student name length, counted in Unicode scalar values.
pub const MAX_NAME_CHARS: usize = 20;

/// Opaque student identity.
///
/// Kept as a plain string so identities minted by older data files
/// (timestamps, `default_*` ids) load without translation.
pub type StudentId = String;

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Free-form note; empty string means "no note".
    #[serde(default, deserialize_with = "crate::model::null_as_default")]
    pub note: String,
    /// Set when added through the engine; legacy entries may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Creates a student with a freshly minted id.
    ///
    /// The caller is responsible for validating `name` first.
    pub fn new(name: impl Into<String>, note: impl Into<String>) -> Self {
        Self::with_id(new_student_id(), name, note)
    }

    /// Creates a student with a caller-provided id.
    pub fn with_id(
        id: impl Into<StudentId>,
        name: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            note: note.into(),
            added_at: None,
        }
    }

    pub fn has_note(&self) -> bool {
        !self.note.is_empty()
    }
}

/// Validation failures for student names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    EmptyName,
    NameTooLong { len: usize, max: usize },
    DuplicateName(String),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "student name must not be blank"),
            Self::NameTooLong { len, max } => {
                write!(f, "student name is {len} characters; at most {max} allowed")
            }
            Self::DuplicateName(name) => write!(f, "student name already exists: `{name}`"),
        }
    }
}

impl Error for StudentValidationError {}

/// Mints a fresh, globally unique student id.
pub fn new_student_id() -> StudentId {
    Uuid::new_v4().to_string()
}

/// Trims and validates a student name, without the roster-level duplicate check.
pub fn normalize_student_name(raw: &str) -> Result<String, StudentValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StudentValidationError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_CHARS {
        return Err(StudentValidationError::NameTooLong {
            len,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Trims a note value.
pub fn normalize_note(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{normalize_student_name, Student, StudentValidationError, MAX_NAME_CHARS};

    #[test]
    fn name_is_trimmed() {
        assert_eq!(normalize_student_name("  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            normalize_student_name(" \t ").unwrap_err(),
            StudentValidationError::EmptyName
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let cjk = "陳".repeat(MAX_NAME_CHARS);
        assert!(normalize_student_name(&cjk).is_ok());

        let too_long = "a".repeat(MAX_NAME_CHARS + 1);
        assert!(matches!(
            normalize_student_name(&too_long),
            Err(StudentValidationError::NameTooLong { len: 21, max: 20 })
        ));
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let first = Student::new("A", "");
        let second = Student::new("A", "");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn missing_note_deserializes_as_empty() {
        let student: Student = serde_json::from_str(r#"{"id":"1","name":"Bob"}"#).unwrap();
        assert!(!student.has_note());
        assert!(student.added_at.is_none());

        let student: Student =
            serde_json::from_str(r#"{"id":"1","name":"Bob","note":null}"#).unwrap();
        assert_eq!(student.note, "");
    }
}
