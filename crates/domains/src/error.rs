//! # DomainError
//!
//! Centralized error handling for the Quillpress workspace.
//! Callers are expected to match on the error kind, never on message text.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Requested entity does not exist (e.g. Account, Blog, Comment).
    #[error("{0} does not exist")]
    NotFound(&'static str),

    /// Actor lacks permission for the action. Fatal to the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed or rule-violating input to a create/update operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Persistence failed for a reason opaque to the business-rule layer.
    #[error("unable to create {0}")]
    UnableToCreate(&'static str),

    #[error("unable to update {0}")]
    UnableToUpdate(&'static str),

    #[error("unable to delete {0}")]
    UnableToDelete(&'static str),

    /// Slug uniqueness retries exhausted.
    #[error("unable to generate unique slug")]
    SlugExhausted,

    /// An account's password did not match its stored hash.
    #[error("password is invalid")]
    InvalidPassword,

    /// The account's email address has not been confirmed.
    #[error("email is not confirmed")]
    EmailNotConfirmed,

    /// A confirm/reset/session token failed verification or expired.
    #[error("token is invalid or expired")]
    InvalidToken,

    /// Storage-layer failure (driver error, constraint violation).
    #[error("storage error: {0}")]
    Storage(String),

    /// Comms-layer failure (mail dispatch).
    #[error("comms error: {0}")]
    Comms(String),
}

/// A specialized Result type for Quillpress domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
