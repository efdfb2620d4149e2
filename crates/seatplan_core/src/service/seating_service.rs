//! Seating assignment engine.
//!
//! # Responsibility
//! - Own the roster, seat map, constraints and display preferences.
//! - Funnel every seat mutation through one constraint gate.
//! - Provide the greedy randomized auto-arrangement.
//!
//! # Invariants
//! - No student occupies two seats after any operation.
//! - Failed operations leave state untouched.
//! - `violates_constraints` is consulted by every placement path.
//! - Auto-arrange is a single greedy pass without backtracking; it may leave
//!   students unplaced even when a complete arrangement exists.

use crate::model::constraint::ConstraintError;
use crate::model::seat::{neighbors, GridConfigError, SeatKey};
use crate::model::state::{AppState, DisplayPrefs, SeatMap};
use crate::model::student::{StudentId, StudentValidationError};
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SeatingResult<T> = Result<T, SeatingError>;

/// Coarse error class shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; recoverable with a message.
    Validation,
    /// Placement or swap blocked by an adjacency constraint.
    ConstraintViolation,
    /// Missing student or seat on a blocking path.
    NotFound,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::ConstraintViolation => "constraint_violation",
            Self::NotFound => "not_found",
        }
    }
}

/// Engine error for seating use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatingError {
    Validation(StudentValidationError),
    Grid(GridConfigError),
    Constraint(ConstraintError),
    ConstraintViolation { student_id: StudentId, seat: SeatKey },
    SeatOccupied { seat: SeatKey, occupant: StudentId },
    SeatOutOfBounds(SeatKey),
    StudentNotFound(StudentId),
    /// Swap target seat is not held by the expected student.
    OccupantMismatch { seat: SeatKey, expected: StudentId },
    SameStudent(StudentId),
    NoStudents,
    EmptyImport,
}

impl SeatingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::Grid(_)
            | Self::Constraint(ConstraintError::InvalidConstraint(_))
            | Self::Constraint(ConstraintError::DuplicateConstraint { .. })
            | Self::SeatOccupied { .. }
            | Self::SameStudent(_)
            | Self::NoStudents
            | Self::EmptyImport => ErrorKind::Validation,
            Self::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Self::Constraint(ConstraintError::UnknownStudent(_))
            | Self::SeatOutOfBounds(_)
            | Self::StudentNotFound(_)
            | Self::OccupantMismatch { .. } => ErrorKind::NotFound,
        }
    }

    /// True for outcomes that should be shown as info rather than failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Constraint(err) if err.is_informational())
    }
}

impl Display for SeatingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Grid(err) => write!(f, "{err}"),
            Self::Constraint(err) => write!(f, "{err}"),
            Self::ConstraintViolation { student_id, seat } => write!(
                f,
                "placing {student_id} at {seat} would seat them next to a forbidden partner"
            ),
            Self::SeatOccupied { seat, occupant } => {
                write!(f, "seat {seat} is already occupied by {occupant}")
            }
            Self::SeatOutOfBounds(seat) => write!(f, "seat {seat} is outside the grid"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::OccupantMismatch { seat, expected } => {
                write!(f, "seat {seat} is not occupied by {expected}")
            }
            Self::SameStudent(id) => write!(f, "cannot swap student {id} with themselves"),
            Self::NoStudents => write!(f, "roster is empty; add students first"),
            Self::EmptyImport => write!(f, "no student names found in input"),
        }
    }
}

impl Error for SeatingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Grid(err) => Some(err),
            Self::Constraint(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for SeatingError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GridConfigError> for SeatingError {
    fn from(value: GridConfigError) -> Self {
        Self::Grid(value)
    }
}

impl From<ConstraintError> for SeatingError {
    fn from(value: ConstraintError) -> Self {
        Self::Constraint(value)
    }
}

/// Result of a successful swap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Both students exchanged seats.
    Exchanged {
        moved: StudentId,
        displaced: StudentId,
        moved_to: SeatKey,
        displaced_to: SeatKey,
    },
    /// The mover had no seat, so the previous occupant lost theirs.
    Replaced {
        moved: StudentId,
        evicted: StudentId,
        seat: SeatKey,
    },
}

/// Summary of one auto-arrange run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrangeReport {
    pub placed: usize,
    /// Students left without a seat, in the shuffled visiting order.
    pub unplaced: Vec<StudentId>,
}

impl ArrangeReport {
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Result of a seat click or drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Placed(SeatKey),
    Swapped(SwapOutcome),
    /// Student dropped on the seat they already hold.
    Unchanged,
}

/// Engine facade owning the single in-memory state.
#[derive(Debug, Clone, Default)]
pub struct SeatingService {
    pub(crate) state: AppState,
    pub(crate) prefs: DisplayPrefs,
}

impl SeatingService {
    pub fn new(state: AppState, prefs: DisplayPrefs) -> Self {
        Self { state, prefs }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn prefs(&self) -> &DisplayPrefs {
        &self.prefs
    }

    /// Swaps in a whole new state, e.g. after a file or remote import.
    pub fn replace_state(&mut self, state: AppState) {
        self.state = state;
    }

    pub fn set_prefs(&mut self, prefs: DisplayPrefs) {
        self.prefs = prefs;
    }

    pub fn into_parts(self) -> (AppState, DisplayPrefs) {
        (self.state, self.prefs)
    }

    /// True when `student_id` at `seat` would be adjacent to a forbidden partner.
    pub fn violates_constraints(&self, student_id: &str, seat: SeatKey) -> bool {
        violates_in(&self.state, &self.state.seat_map, student_id, seat)
    }

    /// Places a student into an empty seat, moving them if already seated.
    ///
    /// Placing a student into the seat they already hold is a no-op.
    ///
    /// # Errors
    /// - `StudentNotFound` / `SeatOutOfBounds` for unknown targets.
    /// - `ConstraintViolation` when a forbidden partner is adjacent.
    /// - `SeatOccupied` when another student holds `seat`.
    pub fn place(&mut self, student_id: &str, seat: SeatKey) -> SeatingResult<()> {
        self.ensure_student(student_id)?;
        self.ensure_in_grid(seat)?;
        if self.state.occupant(seat) == Some(student_id) {
            return Ok(());
        }
        if self.violates_constraints(student_id, seat) {
            return Err(SeatingError::ConstraintViolation {
                student_id: student_id.to_string(),
                seat,
            });
        }
        if let Some(occupant) = self.state.occupant(seat) {
            return Err(SeatingError::SeatOccupied {
                seat,
                occupant: occupant.to_string(),
            });
        }

        self.remove_student_everywhere(student_id);
        self.state.seat_map.insert(seat, student_id.to_string());
        Ok(())
    }

    /// Empties one seat; returns the previous occupant.
    pub fn remove(&mut self, seat: SeatKey) -> Option<StudentId> {
        self.state.seat_map.remove(&seat)
    }

    /// Unseats a student wherever they sit; returns the removed entry count.
    pub fn remove_student_everywhere(&mut self, student_id: &str) -> usize {
        let before = self.state.seat_map.len();
        self.state
            .seat_map
            .retain(|_, occupant| occupant.as_str() != student_id);
        before - self.state.seat_map.len()
    }

    /// Moves `mover` onto `target`, currently held by `occupant`.
    ///
    /// When `mover` already has a seat the two students exchange places;
    /// otherwise `occupant` is unseated. Both new placements are checked
    /// independently, with both students lifted out of the map, before
    /// anything is written.
    pub fn swap(
        &mut self,
        mover: &str,
        occupant: &str,
        target: SeatKey,
    ) -> SeatingResult<SwapOutcome> {
        if mover == occupant {
            return Err(SeatingError::SameStudent(mover.to_string()));
        }
        self.ensure_student(mover)?;
        self.ensure_student(occupant)?;
        self.ensure_in_grid(target)?;
        if self.state.occupant(target) != Some(occupant) {
            return Err(SeatingError::OccupantMismatch {
                seat: target,
                expected: occupant.to_string(),
            });
        }

        let mut proposed: SeatMap = self.state.seat_map.clone();
        let original = self.state.seat_of(mover);
        proposed.retain(|_, id| id.as_str() != mover && id.as_str() != occupant);

        // Each half is judged against the map with both students lifted out.
        if violates_in(&self.state, &proposed, mover, target) {
            return Err(SeatingError::ConstraintViolation {
                student_id: mover.to_string(),
                seat: target,
            });
        }
        if let Some(original_seat) = original {
            if violates_in(&self.state, &proposed, occupant, original_seat) {
                return Err(SeatingError::ConstraintViolation {
                    student_id: occupant.to_string(),
                    seat: original_seat,
                });
            }
        }
        proposed.insert(target, mover.to_string());

        let outcome = match original {
            Some(original_seat) => {
                proposed.insert(original_seat, occupant.to_string());
                SwapOutcome::Exchanged {
                    moved: mover.to_string(),
                    displaced: occupant.to_string(),
                    moved_to: target,
                    displaced_to: original_seat,
                }
            }
            None => SwapOutcome::Replaced {
                moved: mover.to_string(),
                evicted: occupant.to_string(),
                seat: target,
            },
        };

        self.state.seat_map = proposed;
        Ok(outcome)
    }

    /// Seat-click selection: swaps with a different occupant, otherwise places.
    pub fn assign_to_seat(&mut self, student_id: &str, seat: SeatKey) -> SeatingResult<AssignOutcome> {
        match self.state.occupant(seat).map(str::to_string) {
            Some(occupant) if occupant == student_id => Ok(AssignOutcome::Unchanged),
            Some(occupant) => self
                .swap(student_id, &occupant, seat)
                .map(AssignOutcome::Swapped),
            None => self.place(student_id, seat).map(|_| AssignOutcome::Placed(seat)),
        }
    }

    /// Drag-and-drop placement; same rules as [`Self::assign_to_seat`].
    pub fn drop_student(&mut self, student_id: &str, seat: SeatKey) -> SeatingResult<AssignOutcome> {
        self.assign_to_seat(student_id, seat)
    }

    /// Clears the seat map and greedily re-seats every student at random.
    ///
    /// Students and seats are shuffled independently; each student takes the
    /// first empty, non-violating seat in the shuffled seat order.
    ///
    /// # Errors
    /// - `NoStudents` when the roster is empty (state untouched).
    pub fn auto_arrange<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SeatingResult<ArrangeReport> {
        if self.state.students.is_empty() {
            return Err(SeatingError::NoStudents);
        }

        self.state.seat_map.clear();
        let mut order: Vec<StudentId> = self.state.students.iter().map(|s| s.id.clone()).collect();
        order.shuffle(rng);
        let mut seats = self.state.grid.all_seat_keys();
        seats.shuffle(rng);

        let mut placed = 0;
        let mut unplaced = Vec::new();
        for student_id in order {
            let free = seats.iter().copied().find(|seat| {
                !self.state.seat_map.contains_key(seat)
                    && !self.violates_constraints(&student_id, *seat)
            });
            match free {
                Some(seat) => {
                    self.state.seat_map.insert(seat, student_id);
                    placed += 1;
                }
                None => unplaced.push(student_id),
            }
        }

        if unplaced.is_empty() {
            info!(
                "event=auto_arrange module=service status=ok placed={} seats={}",
                placed,
                seats.len()
            );
        } else {
            warn!(
                "event=auto_arrange module=service status=partial placed={} unplaced={} seats={}",
                placed,
                unplaced.len(),
                seats.len()
            );
        }

        Ok(ArrangeReport { placed, unplaced })
    }

    /// Empties every seat; returns how many were occupied.
    pub fn clear_seats(&mut self) -> usize {
        let cleared = self.state.seat_map.len();
        self.state.seat_map.clear();
        cleared
    }

    pub(crate) fn ensure_student(&self, student_id: &str) -> SeatingResult<()> {
        if self.state.contains_student(student_id) {
            Ok(())
        } else {
            Err(SeatingError::StudentNotFound(student_id.to_string()))
        }
    }

    fn ensure_in_grid(&self, seat: SeatKey) -> SeatingResult<()> {
        if self.state.grid.contains(seat) {
            Ok(())
        } else {
            Err(SeatingError::SeatOutOfBounds(seat))
        }
    }
}

fn violates_in(state: &AppState, seat_map: &SeatMap, student_id: &str, seat: SeatKey) -> bool {
    let forbidden = state.constraints.forbidden_partners(student_id);
    if forbidden.is_empty() {
        return false;
    }
    neighbors(seat, state.grid).into_iter().any(|neighbor| {
        seat_map
            .get(&neighbor)
            .is_some_and(|occupant| forbidden.contains(occupant.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::{SeatingError, SeatingService, SwapOutcome};
    use crate::model::seat::{GridConfig, SeatKey};
    use crate::model::state::{AppState, DisplayPrefs};
    use crate::model::student::Student;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn service_with(ids: &[&str], rows: u32, cols: u32) -> SeatingService {
        let state = AppState {
            students: ids
                .iter()
                .map(|id| Student::with_id(*id, id.to_uppercase(), ""))
                .collect(),
            grid: GridConfig::new(rows, cols).unwrap(),
            ..AppState::default()
        };
        SeatingService::new(state, DisplayPrefs::default())
    }

    #[test]
    fn place_moves_student_out_of_previous_seat() {
        let mut service = service_with(&["a"], 2, 2);
        service.place("a", SeatKey::new(1, 1)).unwrap();
        service.place("a", SeatKey::new(2, 2)).unwrap();
        assert_eq!(service.state().seat_map.len(), 1);
        assert_eq!(service.state().seat_of("a"), Some(SeatKey::new(2, 2)));
    }

    #[test]
    fn place_rejects_occupied_and_out_of_grid_seats() {
        let mut service = service_with(&["a", "b"], 2, 2);
        service.place("a", SeatKey::new(1, 1)).unwrap();
        assert!(matches!(
            service.place("b", SeatKey::new(1, 1)),
            Err(SeatingError::SeatOccupied { .. })
        ));
        assert_eq!(
            service.place("b", SeatKey::new(3, 1)),
            Err(SeatingError::SeatOutOfBounds(SeatKey::new(3, 1)))
        );
    }

    #[test]
    fn swap_rejects_displaced_student_landing_by_partner() {
        let mut service = service_with(&["a", "b", "c"], 1, 4);
        service.state.constraints.add("b", "c").unwrap();
        service.place("a", SeatKey::new(1, 1)).unwrap();
        service.place("b", SeatKey::new(1, 4)).unwrap();
        service.place("c", SeatKey::new(1, 2)).unwrap();

        let before = service.state().seat_map.clone();
        let err = service.swap("a", "b", SeatKey::new(1, 4)).unwrap_err();
        assert!(matches!(err, SeatingError::ConstraintViolation { .. }));
        assert_eq!(service.state().seat_map, before);
    }

    #[test]
    fn placing_into_own_seat_ignores_later_constraint() {
        let mut service = service_with(&["a", "b"], 1, 2);
        service.place("a", SeatKey::new(1, 1)).unwrap();
        service.place("b", SeatKey::new(1, 2)).unwrap();
        service.state.constraints.add("a", "b").unwrap();

        assert_eq!(service.place("a", SeatKey::new(1, 1)), Ok(()));
        assert_eq!(service.state().seat_of("a"), Some(SeatKey::new(1, 1)));
        assert_eq!(service.state().seat_of("b"), Some(SeatKey::new(1, 2)));
    }

    #[test]
    fn swap_without_original_seat_evicts_occupant() {
        let mut service = service_with(&["a", "b"], 2, 2);
        service.place("b", SeatKey::new(2, 2)).unwrap();
        let outcome = service.swap("a", "b", SeatKey::new(2, 2)).unwrap();
        assert!(matches!(outcome, SwapOutcome::Replaced { .. }));
        assert_eq!(service.state().seat_of("a"), Some(SeatKey::new(2, 2)));
        assert_eq!(service.state().seat_of("b"), None);
    }

    #[test]
    fn seeded_auto_arrange_is_reproducible() {
        let mut first = service_with(&["a", "b", "c", "d"], 2, 3);
        let mut second = first.clone();
        first.auto_arrange(&mut StdRng::seed_from_u64(7)).unwrap();
        second.auto_arrange(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first.state().seat_map, second.state().seat_map);
        assert_eq!(first.state().seat_map.len(), 4);
    }

    #[test]
    fn auto_arrange_requires_students() {
        let mut service = service_with(&[], 2, 2);
        assert_eq!(
            service.auto_arrange(&mut StdRng::seed_from_u64(1)),
            Err(SeatingError::NoStudents)
        );
    }
}
