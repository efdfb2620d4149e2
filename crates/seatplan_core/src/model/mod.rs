//! Seating domain model.
//!
//! # Responsibility
//! - Define the canonical data structures used by seating logic.
//! - Keep adjacency geometry and the constraint store free of side effects.
//!
//! # Invariants
//! - Every student is identified by a stable `StudentId`.
//! - Seat keys are 1-based `row-col` coordinates inside the active grid.

pub mod constraint;
pub mod seat;
pub mod state;
pub mod student;

use serde::{Deserialize, Deserializer};

/// Reads an explicit JSON `null` as the field's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
