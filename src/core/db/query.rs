/// Query Execution Module
///
/// The executor's operations: create table, fetch one / many / all, update,
/// insert and count. Every method first passes the usage guard, so nothing
/// touches the store while the handle is closed. Writes run in SQLite's
/// autocommit mode and are committed as soon as they return.

use super::connection::DatabaseExecutor;
use super::statement::{
    count_statement, create_table_sql, insert_statement, update_statement, Condition, Select,
    Statement, TableSchema, FETCH_MANY_LIMIT,
};
use crate::core::{Result, StoreError};
use rusqlite::types::Value;
use rusqlite::{ffi, params_from_iter, Connection, ErrorCode};
use tracing::{debug, warn};

/// One result row; values are positional in the order of the selected fields
pub type Row = Vec<Value>;

/// Result of an insert attempt
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The row was stored
    Inserted { rowid: i64 },
    /// A UNIQUE or PRIMARY KEY constraint rejected the row
    Conflict { detail: String },
}

impl InsertOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, InsertOutcome::Conflict { .. })
    }

    /// The conflict description, if any
    pub fn conflict_detail(&self) -> Option<&str> {
        match self {
            InsertOutcome::Conflict { detail } => Some(detail),
            InsertOutcome::Inserted { .. } => None,
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

fn describe_values(values: &[Value]) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|value| match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(t) => format!("{:?}", t),
            Value::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
        })
        .collect();
    format!("({})", parts.join(", "))
}

fn query_rows(conn: &Connection, statement: &Statement) -> rusqlite::Result<Vec<Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "query");
    let mut stmt = conn.prepare(&statement.sql)?;
    let column_count = stmt.column_count();
    let rows = stmt
        .query_map(params_from_iter(statement.params.iter()), |row| {
            (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Row>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

impl DatabaseExecutor {
    /// Creates `table` with the columns of `schema` unless it already exists.
    ///
    /// # Errors
    ///
    /// `StoreError::Validation` when the schema is empty or names are invalid.
    pub fn create_table(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        let conn = self.connection()?;
        let sql = create_table_sql(table, schema)?;
        debug!(sql = %sql, "create table");
        conn.execute(&sql, [])?;
        Ok(())
    }

    /// First row matching `select`, or `None`
    pub fn fetch_one(&self, select: &Select) -> Result<Option<Row>> {
        let conn = self.connection()?;
        let statement = select.render_capped(1)?;
        Ok(query_rows(conn, &statement)?.into_iter().next())
    }

    /// Up to `FETCH_MANY_LIMIT` rows matching `select`
    pub fn fetch_many(&self, select: &Select) -> Result<Vec<Row>> {
        let conn = self.connection()?;
        let statement = select.render_capped(FETCH_MANY_LIMIT)?;
        Ok(query_rows(conn, &statement)?)
    }

    /// Every row matching `select`
    pub fn fetch_all(&self, select: &Select) -> Result<Vec<Row>> {
        let conn = self.connection()?;
        let statement = select.render()?;
        Ok(query_rows(conn, &statement)?)
    }

    /// Sets `assignments` on the rows matching `condition` and returns how many changed.
    ///
    /// **Without a condition every row in `table` is updated.**
    ///
    /// # Errors
    ///
    /// SQLite failures are reported as `StoreError::Update`.
    pub fn update(
        &mut self,
        table: &str,
        assignments: &[(&str, Value)],
        condition: Option<&Condition>,
    ) -> Result<usize> {
        let conn = self.connection()?;
        let statement = update_statement(table, assignments, condition)?;
        if condition.is_none() {
            warn!("Updating every row of {}", table);
        }
        debug!(sql = %statement.sql, params = statement.params.len(), "update");

        conn.execute(&statement.sql, params_from_iter(statement.params.iter()))
            .map_err(|source| StoreError::Update {
                table: table.to_string(),
                source,
            })
    }

    /// Inserts one row. `fields` names the target columns; without it the
    /// values must cover every column in table order.
    ///
    /// Uniqueness violations come back as `InsertOutcome::Conflict`; every
    /// other failure is an error.
    pub fn insert(&mut self, table: &str, values: &[Value], fields: Option<&[&str]>) -> Result<InsertOutcome> {
        let conn = self.connection()?;
        let statement = insert_statement(table, values, fields)?;
        debug!(sql = %statement.sql, params = statement.params.len(), "insert");

        match conn.execute(&statement.sql, params_from_iter(statement.params.iter())) {
            Ok(_) => Ok(InsertOutcome::Inserted {
                rowid: conn.last_insert_rowid(),
            }),
            Err(e) if is_unique_violation(&e) => {
                let detail = format!("{} already exists: {}", describe_values(values), e);
                warn!("{}", detail);
                Ok(InsertOutcome::Conflict { detail })
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    /// Number of rows in `table` matching `condition`
    pub fn count(&self, table: &str, condition: Option<&Condition>) -> Result<i64> {
        let conn = self.connection()?;
        let statement = count_statement(table, condition)?;
        debug!(sql = %statement.sql, "count");
        let count = conn.query_row(&statement.sql, params_from_iter(statement.params.iter()), |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}
