//! Directory domain model.
//!
//! # Responsibility
//! - Define the person record exchanged with the backend.
//! - Keep wire naming and date formats in one place.
//!
//! # Invariants
//! - A record's identity is assigned by the backend and never changes.
//! - Age is derived data; the client never sends it.

pub mod person;
pub mod wire;
