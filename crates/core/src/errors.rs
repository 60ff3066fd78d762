//! Core error types for the Linkstash application.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the bookmark application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The record is absent or owned by a different identity. The two cases
    /// are deliberately indistinguishable so callers cannot probe for the
    /// existence of another owner's records.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// An internal storage error that does not fit the other variants.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Validation errors raised before any store access.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
