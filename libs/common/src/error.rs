//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred while creating tables at startup
    #[error("Database schema error: {0}")]
    Schema(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error raised while assembling the process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is absent or empty
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// A variable is present but holds an unusable value
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// Database section failed to load
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
