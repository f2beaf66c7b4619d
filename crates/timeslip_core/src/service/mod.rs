//! Core use-case services.
//!
//! # Responsibility
//! - Own journal state and expose the enumerated mutation operations.
//! - Keep presentation layers decoupled from storage details.

pub mod journal_service;
