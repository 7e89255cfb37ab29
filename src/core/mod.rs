/// Core Module for hookah_store
///
/// This module contains the data-access layer: the scoped connection
/// handle, SQL statement rendering and the query executor, together with
/// the crate-wide error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
