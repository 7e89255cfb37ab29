/// Store Error Module
///
/// This module defines the error type shared by every layer of hookah_store.
/// Insert conflicts are deliberately absent: they are reported through
/// `InsertOutcome` and never raised.
use thiserror::Error;

/// Error type for the hookah_store crate.
///
/// - Usage errors: an operation was attempted outside an open connection scope
/// - Validation errors: bad schema, identifiers, or argument shapes
/// - Database errors from SQLite, plus update failures tagged with their table
/// - Configuration, I/O and JSON errors from the outer layers
#[derive(Error, Debug)]
pub enum StoreError {
    /// An executor method was called while the connection is closed
    #[error("Usage error: {0}")]
    Usage(String),

    /// Input rejected before any SQL was executed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database-related errors from SQLite operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An UPDATE statement failed
    #[error("Failed to update {table}: {source}")]
    Update {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing and validation errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result to use StoreError as the error type.
pub type Result<T> = std::result::Result<T, StoreError>;
