/// Database Module
///
/// This module provides the data-access layer of hookah_store, organized
/// into focused submodules.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): the scoped `DatabaseExecutor`
///   handle, its open/closed state and the usage guard
/// - **Statement Rendering** (`statement.rs`): identifier validation and the
///   SQL text + bound parameter pairs for every operation
/// - **Query Execution** (`query.rs`): create table, fetch, update and insert
///
/// ## Error Handling
///
/// All database operations use `StoreError`. Duplicate-key inserts are the one
/// exception: they come back as `InsertOutcome::Conflict`.
pub mod connection;
pub mod query;
pub mod statement;

pub use connection::*;
pub use query::*;
pub use statement::*;
