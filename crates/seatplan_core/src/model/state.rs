//! Aggregate seating state and display preferences.
//!
//! # Responsibility
//! - Group roster, grid, seat map and constraints into the persisted unit.
//! - Provide read-side lookups shared by the engine and persistence layers.
//! - Repair externally supplied state so it satisfies core invariants.
//!
//! # Invariants
//! - A student id appears at most once as a seat-map value.
//! - Seat-map keys lie inside `grid`.
//! - Seat-map values and constraint members reference roster students.

use crate::model::constraint::ConstraintSet;
use crate::model::seat::{GridConfig, GridConfigError, SeatKey};
use crate::model::student::{Student, StudentId};
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};

/// Partial mapping from seat to occupant.
pub type SeatMap = BTreeMap<SeatKey, StudentId>;

pub const DEFAULT_PRINT_FONT_SIZE: u32 = 16;
pub const MIN_PRINT_FONT_SIZE: u32 = 10;
pub const MAX_PRINT_FONT_SIZE: u32 = 32;
pub const DEFAULT_CLASS_NAME: &str = "課後班";

/// Roster seeded on first start or after an unreadable local record.
pub const DEFAULT_STUDENT_NAMES: [&str; 23] = [
    "陳昱允", "彭翊恩", "章彥廷", "曾依凡", "張瑞恩", "張宸晞", "麥惠媛", "陳柳鈴", "吳睿凱",
    "詹欣容", "李誠恩", "涂毅宏", "曾聿寧", "方語喆", "王勻希", "伊妍欣", "麥庭綺", "彭立宸",
    "吳睿勳", "連廷駿", "余柏勳", "邱閔昊", "伊妤欣",
];

/// Print/export presentation settings. Never affect seating semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPrefs {
    pub print_font_size: u32,
    pub class_name: String,
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        Self {
            print_font_size: DEFAULT_PRINT_FONT_SIZE,
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

impl DisplayPrefs {
    pub fn clamp_font_size(size: u32) -> u32 {
        size.clamp(MIN_PRINT_FONT_SIZE, MAX_PRINT_FONT_SIZE)
    }

    /// Blank class names fall back to the default label.
    pub fn normalize_class_name(name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            DEFAULT_CLASS_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// The unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub students: Vec<Student>,
    pub grid: GridConfig,
    pub seat_map: SeatMap,
    pub constraints: ConstraintSet,
}

/// Counts of entries dropped by [`AppState::sanitize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub dropped_seats: usize,
    pub dropped_constraints: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_seats == 0 && self.dropped_constraints == 0
    }
}

impl AppState {
    /// Default grid with the seeded roster and nothing placed.
    pub fn seeded() -> Self {
        Self {
            students: default_roster(),
            ..Self::default()
        }
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == student_id)
    }

    pub fn student_by_name(&self, name: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.name == name)
    }

    pub fn contains_student(&self, student_id: &str) -> bool {
        self.student(student_id).is_some()
    }

    pub fn seat_of(&self, student_id: &str) -> Option<SeatKey> {
        self.seat_map
            .iter()
            .find(|(_, occupant)| occupant.as_str() == student_id)
            .map(|(seat, _)| *seat)
    }

    pub fn occupant(&self, seat: SeatKey) -> Option<&str> {
        self.seat_map.get(&seat).map(String::as_str)
    }

    /// Roster entries without a seat, in roster order.
    pub fn unseated_students(&self) -> Vec<&Student> {
        let seated: HashSet<&str> = self.seat_map.values().map(String::as_str).collect();
        self.students
            .iter()
            .filter(|student| !seated.contains(student.id.as_str()))
            .collect()
    }

    /// Empty in-grid seats in row-major order.
    pub fn available_seats(&self) -> Vec<SeatKey> {
        self.grid
            .all_seat_keys()
            .into_iter()
            .filter(|seat| !self.seat_map.contains_key(seat))
            .collect()
    }

    /// Drops seat entries and constraints that break core invariants.
    ///
    /// # Errors
    /// - Returns the grid error when `grid` itself is out of range; nothing
    ///   is repaired in that case.
    pub fn sanitize(&mut self) -> Result<SanitizeReport, GridConfigError> {
        self.grid.validate()?;

        let known: HashSet<&str> = self.students.iter().map(|s| s.id.as_str()).collect();
        let grid = self.grid;
        let mut seen = HashSet::new();
        let before_seats = self.seat_map.len();
        self.seat_map.retain(|seat, occupant| {
            grid.contains(*seat) && known.contains(occupant.as_str()) && seen.insert(occupant.clone())
        });
        let dropped_seats = before_seats - self.seat_map.len();

        let mut seen_pairs: Vec<(String, String)> = Vec::new();
        let dropped_constraints = self.constraints.retain(|pair| {
            if pair.a == pair.b || !known.contains(pair.a.as_str()) || !known.contains(pair.b.as_str()) {
                return false;
            }
            let key = if pair.a < pair.b {
                (pair.a.clone(), pair.b.clone())
            } else {
                (pair.b.clone(), pair.a.clone())
            };
            if seen_pairs.contains(&key) {
                return false;
            }
            seen_pairs.push(key);
            true
        });

        Ok(SanitizeReport {
            dropped_seats,
            dropped_constraints,
        })
    }

    /// True when any roster id occurs twice.
    pub fn has_duplicate_student_ids(&self) -> bool {
        let mut ids = HashSet::new();
        self.students.iter().any(|student| !ids.insert(student.id.as_str()))
    }
}

/// Builds the seeded roster with fresh `default_*` ids.
pub fn default_roster() -> Vec<Student> {
    let now = Utc::now();
    let stamp = now.timestamp_millis();
    DEFAULT_STUDENT_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mut student = Student::with_id(format!("default_{stamp}_{index}"), *name, "");
            student.added_at = Some(now);
            student
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{default_roster, AppState, DisplayPrefs, DEFAULT_CLASS_NAME};
    use crate::model::seat::{GridConfig, SeatKey};
    use crate::model::student::Student;

    fn two_students() -> AppState {
        AppState {
            students: vec![Student::with_id("a", "A", ""), Student::with_id("b", "B", "")],
            ..AppState::default()
        }
    }

    #[test]
    fn default_roster_has_unique_ids_and_names() {
        let roster = default_roster();
        assert_eq!(roster.len(), 23);
        let state = AppState {
            students: roster,
            ..AppState::default()
        };
        assert!(!state.has_duplicate_student_ids());
    }

    #[test]
    fn sanitize_drops_dangling_and_duplicate_entries() {
        let mut state = two_students();
        state.grid = GridConfig::new(2, 2).unwrap();
        state.seat_map.insert(SeatKey::new(1, 1), "a".to_string());
        state.seat_map.insert(SeatKey::new(1, 2), "a".to_string());
        state.seat_map.insert(SeatKey::new(2, 2), "ghost".to_string());
        state.seat_map.insert(SeatKey::new(3, 1), "b".to_string());
        state.constraints.add("a", "b").unwrap();
        state.constraints.add("a", "ghost").unwrap();

        let report = state.sanitize().unwrap();
        assert_eq!(report.dropped_seats, 3);
        assert_eq!(report.dropped_constraints, 1);
        assert_eq!(state.seat_of("a"), Some(SeatKey::new(1, 1)));
        assert_eq!(state.seat_of("b"), None);
    }

    #[test]
    fn sanitize_rejects_out_of_range_grid() {
        let mut state = two_students();
        state.grid = GridConfig { rows: 11, cols: 2 };
        assert!(state.sanitize().is_err());
    }

    #[test]
    fn blank_class_name_resets_to_default() {
        assert_eq!(DisplayPrefs::normalize_class_name("  "), DEFAULT_CLASS_NAME);
        assert_eq!(DisplayPrefs::normalize_class_name(" 3A "), "3A");
        assert_eq!(DisplayPrefs::clamp_font_size(99), 32);
    }

    #[test]
    fn available_seats_skip_occupied_ones() {
        let mut state = two_students();
        state.grid = GridConfig::new(1, 3).unwrap();
        state.seat_map.insert(SeatKey::new(1, 2), "a".to_string());
        assert_eq!(
            state.available_seats(),
            vec![SeatKey::new(1, 1), SeatKey::new(1, 3)]
        );
        assert_eq!(state.unseated_students().len(), 1);
    }
}
