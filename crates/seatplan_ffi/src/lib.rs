//! Flutter-facing bindings for the seating planner core.

pub mod api;
