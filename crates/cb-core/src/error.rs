//! # AppError
//!
//! Centralized error handling for the Coursebox library.
//! Every core operation either fully applies or fails with one of these.

use thiserror::Error;

/// The primary error type for all cb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Registration attempted with a username that is already taken
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    /// Unknown username or wrong password. The two cases are not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Authenticated, but the role does not allow the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (e.g., Course, Material)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Boundary input rejected (e.g., empty username, unknown role)
    #[error("validation error: {0}")]
    Validation(String),

    /// Snapshot could not be read, parsed, or written
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Wraps a port failure. The full context chain is kept in the message.
    pub fn storage(err: anyhow::Error) -> Self {
        AppError::Storage(format!("{err:#}"))
    }
}

/// A specialized Result type for Coursebox logic.
pub type Result<T> = std::result::Result<T, AppError>;
