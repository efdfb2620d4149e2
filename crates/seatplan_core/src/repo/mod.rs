//! Persistence adapters for the seating state.
//!
//! # Responsibility
//! - Define the snapshot-level load/save contract shared by all backends.
//! - Keep JSON shapes, SQLite and HTTP details out of the engine.
//!
//! # Invariants
//! - Every backend reads or overwrites the whole snapshot; no partial merges.
//! - Loaded snapshots are sanitized before they reach the engine.
//! - A failed load or save never touches in-memory state.

pub mod file_store;
pub mod local_store;
pub mod remote_store;
pub mod snapshot;
pub mod state_repo;
