//! Domain layer for the kibitzer analysis pipeline
//!
//! Pure data, invariants and the ports external collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
