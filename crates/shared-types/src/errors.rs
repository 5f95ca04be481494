//! # Error Types
//!
//! Defines error types used across subsystems.
//!
//! Error handling contract: nothing here is fatal to the process. Every
//! failure is per-operation and recoverable by user retry. `Conflict` is
//! informational (duplicate contact, lost status race) and must not block
//! subsequent operations.

use crate::entities::RequestStatus;
use crate::ids::{ProfileId, RequestId};
use thiserror::Error;

/// Errors reported by the matching core's operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed input; the operation was not attempted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate insert or a lost concurrent race. Informational, not a
    /// failure state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Attempted state change outside the request state machine.
    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// A profile or request edge of the operation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An operation referenced the caller's own profile as its target.
    #[error("Operation cannot target the caller's own profile")]
    SelfReference,

    /// The actor is not the party allowed to perform this operation.
    #[error("Profile {actor} is not authorized to modify request {request}")]
    Unauthorized {
        actor: ProfileId,
        request: RequestId,
    },

    /// Identity/data/blob/channel backend unavailable. Retryable by the
    /// user; the core never retries automatically.
    #[error("External service error: {0}")]
    External(String),
}

/// Errors surfaced by Profile Store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Row not found.
    #[error("Row not found: {0}")]
    NotFound(String),

    /// Unique-index violation on insert (e.g. duplicate contact edge).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A conditional status update lost the race: the row's current status
    /// did not match the expected value.
    #[error("Status conflict: expected {expected}, found {actual}")]
    StatusConflict {
        expected: RequestStatus,
        actual: RequestStatus,
    },

    /// Interior lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Backend unavailable or misbehaving.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::UniqueViolation(what) => Self::Conflict(what),
            StoreError::StatusConflict { expected, actual } => Self::Conflict(format!(
                "request already moved from {expected} to {actual}"
            )),
            StoreError::LockPoisoned | StoreError::Backend(_) => Self::External(err.to_string()),
        }
    }
}
