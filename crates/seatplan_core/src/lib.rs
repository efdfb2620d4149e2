//! Core domain logic for the classroom seating planner.
//! This crate is the single source of truth for seating invariants.

pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use controller::{ControllerError, ControllerResult, LoadSource, SeatingController};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::constraint::{Constraint, ConstraintError, ConstraintSet};
pub use model::seat::{neighbors, GridConfig, GridConfigError, SeatKey, SeatKeyParseError};
pub use model::state::{AppState, DisplayPrefs, SeatMap};
pub use model::student::{Student, StudentId, StudentValidationError};
pub use repo::file_store::{default_export_file_name, FileStore};
pub use repo::local_store::{SqliteLocalStore, LOCAL_STORAGE_KEY};
pub use repo::remote_store::{RemoteStore, RemoteStoreConfig};
pub use repo::state_repo::{RepoError, RepoResult, StateRepository, StateSnapshot};
pub use service::command::{CommandOutcome, SeatingCommand};
pub use service::seating_service::{
    ArrangeReport, AssignOutcome, ErrorKind, SeatingError, SeatingResult, SeatingService,
    SwapOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
