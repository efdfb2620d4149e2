//! Seating use-case services.
//!
//! # Responsibility
//! - Orchestrate model operations into use-case level APIs.
//! - Keep UI/FFI layers decoupled from state representation details.

pub mod command;
pub mod resize;
pub mod roster;
pub mod seating_service;
