//! Backend REST client.
//!
//! # Responsibility
//! - Define the backend contract the directory store depends on.
//! - Provide the HTTP implementation of that contract.
//!
//! # Invariants
//! - Page numbers are 1-based at this boundary.
//! - No call is retried; every failure is returned to the caller once.

pub mod backend;
pub mod error;
pub mod http;
