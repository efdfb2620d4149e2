//! Intent dispatch for UI collaborators.
//!
//! UI layers send a `SeatingCommand` and render from the returned
//! `CommandOutcome` plus the engine state; they never mutate state directly.

use crate::model::constraint::Constraint;
use crate::model::seat::SeatKey;
use crate::model::student::{Student, StudentId};
use crate::service::resize::ResizeReport;
use crate::service::roster::BulkImportReport;
use crate::service::seating_service::{
    ArrangeReport, AssignOutcome, SeatingResult, SeatingService, SwapOutcome,
};
use rand::Rng;

/// One user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatingCommand {
    AddStudent { name: String, note: String },
    EditStudent { student_id: StudentId, name: String, note: String },
    RemoveStudent { student_id: StudentId },
    AddStudents { raw: String },
    LoadDefaultStudents { clear_seating: bool },
    Place { student_id: StudentId, seat: SeatKey },
    /// Seat-click selection or drag-and-drop onto `seat`.
    Assign { student_id: StudentId, seat: SeatKey },
    ClearSeat { seat: SeatKey },
    Swap { mover: StudentId, occupant: StudentId, target: SeatKey },
    AutoArrange,
    ClearSeats,
    Resize { rows: u32, cols: u32 },
    AddConstraint { a: StudentId, b: StudentId },
    RemoveConstraintAt { index: usize },
    SetPrintFontSize { size: u32 },
    SetClassName { name: String },
}

/// Result value for one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    StudentAdded(Student),
    StudentUpdated(Student),
    StudentRemoved(Option<Student>),
    StudentsImported(BulkImportReport),
    DefaultsLoaded(usize),
    Placed(SeatKey),
    Assigned(AssignOutcome),
    SeatCleared(Option<StudentId>),
    Swapped(SwapOutcome),
    Arranged(ArrangeReport),
    SeatsCleared(usize),
    Resized(ResizeReport),
    ConstraintAdded,
    ConstraintRemoved(Option<Constraint>),
    FontSizeSet(u32),
    ClassNameSet(String),
}

impl CommandOutcome {
    /// False for no-op outcomes, which callers need not persist.
    pub fn mutated(&self) -> bool {
        match self {
            Self::StudentRemoved(removed) => removed.is_some(),
            Self::StudentsImported(report) => report.added > 0,
            Self::Assigned(outcome) => *outcome != AssignOutcome::Unchanged,
            Self::SeatCleared(previous) => previous.is_some(),
            Self::SeatsCleared(count) => *count > 0,
            Self::ConstraintRemoved(removed) => removed.is_some(),
            _ => true,
        }
    }
}

impl SeatingService {
    /// Executes one command against the engine.
    ///
    /// `rng` is only consumed by `AutoArrange`.
    pub fn dispatch<R: Rng + ?Sized>(
        &mut self,
        command: SeatingCommand,
        rng: &mut R,
    ) -> SeatingResult<CommandOutcome> {
        let outcome = match command {
            SeatingCommand::AddStudent { name, note } => {
                CommandOutcome::StudentAdded(self.add_student(&name, &note)?)
            }
            SeatingCommand::EditStudent {
                student_id,
                name,
                note,
            } => CommandOutcome::StudentUpdated(self.edit_student(&student_id, &name, &note)?),
            SeatingCommand::RemoveStudent { student_id } => {
                CommandOutcome::StudentRemoved(self.remove_student(&student_id))
            }
            SeatingCommand::AddStudents { raw } => {
                CommandOutcome::StudentsImported(self.add_multiple_students(&raw)?)
            }
            SeatingCommand::LoadDefaultStudents { clear_seating } => {
                CommandOutcome::DefaultsLoaded(self.load_default_students(clear_seating))
            }
            SeatingCommand::Place { student_id, seat } => {
                self.place(&student_id, seat)?;
                CommandOutcome::Placed(seat)
            }
            SeatingCommand::Assign { student_id, seat } => {
                CommandOutcome::Assigned(self.assign_to_seat(&student_id, seat)?)
            }
            SeatingCommand::ClearSeat { seat } => CommandOutcome::SeatCleared(self.remove(seat)),
            SeatingCommand::Swap {
                mover,
                occupant,
                target,
            } => CommandOutcome::Swapped(self.swap(&mover, &occupant, target)?),
            SeatingCommand::AutoArrange => CommandOutcome::Arranged(self.auto_arrange(rng)?),
            SeatingCommand::ClearSeats => CommandOutcome::SeatsCleared(self.clear_seats()),
            SeatingCommand::Resize { rows, cols } => {
                CommandOutcome::Resized(self.resize(rows, cols)?)
            }
            SeatingCommand::AddConstraint { a, b } => {
                self.add_constraint(&a, &b)?;
                CommandOutcome::ConstraintAdded
            }
            SeatingCommand::RemoveConstraintAt { index } => {
                CommandOutcome::ConstraintRemoved(self.remove_constraint_at(index))
            }
            SeatingCommand::SetPrintFontSize { size } => {
                CommandOutcome::FontSizeSet(self.set_print_font_size(size))
            }
            SeatingCommand::SetClassName { name } => {
                CommandOutcome::ClassNameSet(self.set_class_name(&name).to_string())
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandOutcome, SeatingCommand};
    use crate::model::seat::SeatKey;
    use crate::service::seating_service::SeatingService;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn dispatch_routes_to_engine_operations() {
        let mut service = SeatingService::default();
        let mut rng = StdRng::seed_from_u64(3);

        let added = service
            .dispatch(
                SeatingCommand::AddStudent {
                    name: "Ann".to_string(),
                    note: String::new(),
                },
                &mut rng,
            )
            .unwrap();
        let CommandOutcome::StudentAdded(student) = added else {
            panic!("unexpected outcome: {added:?}");
        };

        let placed = service
            .dispatch(
                SeatingCommand::Place {
                    student_id: student.id.clone(),
                    seat: SeatKey::new(2, 3),
                },
                &mut rng,
            )
            .unwrap();
        assert!(placed.mutated());
        assert_eq!(service.state().seat_of(&student.id), Some(SeatKey::new(2, 3)));
    }

    #[test]
    fn noop_outcomes_report_no_mutation() {
        let mut service = SeatingService::default();
        let mut rng = StdRng::seed_from_u64(3);
        let cleared = service
            .dispatch(SeatingCommand::ClearSeats, &mut rng)
            .unwrap();
        assert_eq!(cleared, CommandOutcome::SeatsCleared(0));
        assert!(!cleared.mutated());
    }
}
