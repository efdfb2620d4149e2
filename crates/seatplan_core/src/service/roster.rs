//! Roster, constraint and preference use-cases on the seating engine.
//!
//! # Responsibility
//! - Validate and apply student add/edit/remove, including bulk text import.
//! - Cascade student removal into the seat map and constraint store.
//! - Gate constraint inserts on roster membership.
//!
//! # Invariants
//! - Student names are unique (case-sensitive) after every operation.
//! - After `remove_student`, no seat or constraint references the id.
//! - Bulk import never fails for partial problems; only for empty input.

use crate::model::constraint::{Constraint, ConstraintError};
use crate::model::state::{default_roster, DisplayPrefs};
use crate::model::student::{
    normalize_note, normalize_student_name, Student, StudentValidationError,
};
use crate::service::seating_service::{SeatingError, SeatingResult, SeatingService};
use chrono::Utc;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static SEGMENT_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n,，、]+").expect("valid segment separator regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Counts reported by bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkImportReport {
    pub added: usize,
    pub duplicate: usize,
    pub invalid: usize,
}

/// Splits bulk roster text into `name` or `name|note` tokens.
///
/// Rules:
/// - Newlines, ASCII/full-width commas and the ideographic comma always
///   separate entries.
/// - A segment containing `|` is one `name|note` entry, so notes may hold
///   spaces.
/// - Any other segment is further split on whitespace runs.
pub fn split_bulk_entries(raw: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    for segment in SEGMENT_SEPARATOR_RE.split(raw) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if segment.contains('|') {
            entries.push(segment);
            continue;
        }
        entries.extend(WHITESPACE_RE.split(segment).filter(|token| !token.is_empty()));
    }
    entries
}

/// Splits one entry into `(name, note)` on the first `|`.
fn split_name_note(entry: &str) -> (&str, &str) {
    match entry.split_once('|') {
        Some((name, note)) => (name, note),
        None => (entry, ""),
    }
}

impl SeatingService {
    /// Adds one student; returns the stored record.
    ///
    /// # Errors
    /// - `EmptyName`, `NameTooLong`, `DuplicateName` as validation errors.
    pub fn add_student(&mut self, name: &str, note: &str) -> SeatingResult<Student> {
        let name = self.validate_new_name(name, None)?;
        let mut student = Student::new(name, normalize_note(note));
        student.added_at = Some(Utc::now());
        self.state.students.push(student.clone());
        Ok(student)
    }

    /// Renames a student and replaces their note.
    ///
    /// The student's own current name does not count as a duplicate.
    pub fn edit_student(
        &mut self,
        student_id: &str,
        new_name: &str,
        new_note: &str,
    ) -> SeatingResult<Student> {
        self.ensure_student(student_id)?;
        let name = self.validate_new_name(new_name, Some(student_id))?;
        let student = self
            .state
            .students
            .iter_mut()
            .find(|student| student.id == student_id)
            .ok_or_else(|| SeatingError::StudentNotFound(student_id.to_string()))?;
        student.name = name;
        student.note = normalize_note(new_note);
        Ok(student.clone())
    }

    /// Deletes a student and every seat/constraint reference to them.
    ///
    /// Unknown ids are a silent no-op (`None`).
    pub fn remove_student(&mut self, student_id: &str) -> Option<Student> {
        let index = self
            .state
            .students
            .iter()
            .position(|student| student.id == student_id)?;
        let removed = self.state.students.remove(index);
        self.remove_student_everywhere(student_id);
        self.state.constraints.purge(student_id);
        Some(removed)
    }

    /// Adds every valid entry from free-form text.
    ///
    /// # Errors
    /// - `EmptyImport` when the text holds no entries at all.
    pub fn add_multiple_students(&mut self, raw: &str) -> SeatingResult<BulkImportReport> {
        let entries = split_bulk_entries(raw);
        if entries.is_empty() {
            return Err(SeatingError::EmptyImport);
        }

        let mut report = BulkImportReport::default();
        let added_at = Utc::now();
        for entry in entries {
            let (name, note) = split_name_note(entry);
            match self.validate_new_name(name, None) {
                Ok(name) => {
                    let mut student = Student::new(name, normalize_note(note));
                    student.added_at = Some(added_at);
                    self.state.students.push(student);
                    report.added += 1;
                }
                Err(StudentValidationError::DuplicateName(_)) => report.duplicate += 1,
                Err(_) => report.invalid += 1,
            }
        }

        info!(
            "event=bulk_import module=service status=ok added={} duplicate={} invalid={}",
            report.added, report.duplicate, report.invalid
        );
        Ok(report)
    }

    /// Replaces the roster with the seeded default names.
    ///
    /// Seats and constraints that referenced dropped students are removed;
    /// with `clear_seating` the whole seat map is emptied.
    pub fn load_default_students(&mut self, clear_seating: bool) -> usize {
        self.state.students = default_roster();
        if clear_seating {
            self.state.seat_map.clear();
        }
        // Old ids are gone, so sanitize drops their seats and pairs.
        if let Err(err) = self.state.sanitize() {
            warn!("event=load_defaults module=service status=warn error={err}");
        }
        self.state.students.len()
    }

    /// Adds a forbidden-adjacency pair between two roster students.
    pub fn add_constraint(&mut self, a: &str, b: &str) -> SeatingResult<()> {
        for id in [a, b] {
            if !self.state.contains_student(id) {
                return Err(ConstraintError::UnknownStudent(id.to_string()).into());
            }
        }
        self.state.constraints.add(a, b)?;
        Ok(())
    }

    /// Removes a pair by list position; out-of-range is a no-op.
    pub fn remove_constraint_at(&mut self, index: usize) -> Option<Constraint> {
        self.state.constraints.remove_at(index)
    }

    /// Removes a pair by value in either order.
    pub fn remove_constraint(&mut self, a: &str, b: &str) -> bool {
        self.state.constraints.remove(a, b)
    }

    /// Stores the print font size, clamped to the supported range.
    pub fn set_print_font_size(&mut self, size: u32) -> u32 {
        self.prefs.print_font_size = DisplayPrefs::clamp_font_size(size);
        self.prefs.print_font_size
    }

    /// Stores the class label; blank input restores the default label.
    pub fn set_class_name(&mut self, name: &str) -> &str {
        self.prefs.class_name = DisplayPrefs::normalize_class_name(name);
        &self.prefs.class_name
    }

    fn validate_new_name(
        &self,
        raw: &str,
        editing: Option<&str>,
    ) -> Result<String, StudentValidationError> {
        let name = normalize_student_name(raw)?;
        let taken = self
            .state
            .students
            .iter()
            .any(|student| student.name == name && Some(student.id.as_str()) != editing);
        if taken {
            return Err(StudentValidationError::DuplicateName(name));
        }
        Ok(name)
    }
}
