//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Rejected locally before any store call (empty selection, missing fields).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation on insert: another client claimed the start time first.
    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Store(String),

    /// Interactive prompt cancelled or failed.
    #[error("Input interrupted: {0}")]
    Interrupted(String),
}
