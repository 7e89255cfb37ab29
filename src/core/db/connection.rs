/// Connection Management Module
///
/// This module provides the scoped database handle. A `DatabaseExecutor`
/// starts closed, holds exactly one SQLite connection while open, and always
/// releases it again: explicitly through `close`, at the end of `scoped`, or
/// when the handle is dropped.

use crate::config::DatabaseConfig;
use crate::core::{Result, StoreError};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle states of a `DatabaseExecutor`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionState {
    /// No connection held; every query fails with a usage error
    Closed,
    /// Connection held and ready for queries
    Open,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Closed
    }
}

/// Scoped handle over a single file-backed SQLite connection.
///
/// The query methods live in `query.rs`; this file owns the open/closed
/// state and the usage guard they all go through.
#[derive(Debug)]
pub struct DatabaseExecutor {
    /// Path of the store file
    path: PathBuf,
    /// Active connection (None while closed)
    connection: Option<Connection>,
}

impl DatabaseExecutor {
    /// Handle for `database/<name>.db`
    pub fn new(name: &str) -> Self {
        Self::with_config(&DatabaseConfig::named(name))
    }

    /// Handle for the store described by `config`
    pub fn with_config(config: &DatabaseConfig) -> Self {
        Self::at_path(config.path())
    }

    /// Handle for an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        DatabaseExecutor {
            path: path.into(),
            connection: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Opens the connection, creating the store file and its directory if needed.
    ///
    /// # Errors
    ///
    /// `StoreError::Usage` if the handle is already open, `StoreError::Io` if
    /// the directory cannot be created and `StoreError::Database` if SQLite
    /// refuses the file.
    pub fn open(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Err(StoreError::Usage(format!(
                "Database {} is already open",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.path)?;
        info!("Opened database {}", self.path.display());
        self.connection = Some(conn);
        Ok(())
    }

    /// Releases the connection. Safe to call when already closed.
    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            // On failure the connection comes back to us and is dropped, which closes it anyway.
            if let Err((_conn, e)) = conn.close() {
                warn!("Error while closing {}: {}", self.path.display(), e);
            }
            info!("Closed database {}", self.path.display());
        }
    }

    /// Opens the handle, runs `body` and closes the handle again.
    ///
    /// The connection is released whether `body` succeeds, fails or panics.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hookah_store::core::db::{DatabaseExecutor, Select};
    ///
    /// let rows = DatabaseExecutor::new("hookah").scoped(|db| db.fetch_all(&Select::table("tobaccos")))?;
    /// # Ok::<(), hookah_store::core::StoreError>(())
    /// ```
    pub fn scoped<T, F>(mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut DatabaseExecutor) -> Result<T>,
    {
        self.open()?;
        let result = body(&mut self);
        self.close();
        result
    }

    /// The usage guard: the open connection, or a usage error while closed
    pub(crate) fn connection(&self) -> Result<&Connection> {
        match &self.connection {
            Some(conn) => Ok(conn),
            None => {
                debug!("Rejected operation on closed database {}", self.path.display());
                Err(StoreError::Usage(
                    "Database must be opened before it is queried".to_string(),
                ))
            }
        }
    }
}

impl Drop for DatabaseExecutor {
    fn drop(&mut self) {
        self.close();
    }
}
