/// Statement Rendering Module
///
/// Turns the executor's typed arguments into SQL text plus an ordered list of
/// bound values. Identifiers are checked against a strict pattern before they
/// are placed into SQL; values only ever travel as `?` parameters.

use crate::core::{Result, StoreError};
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use regex::Regex;

/// Upper bound on rows returned by `fetch_many`
pub const FETCH_MANY_LIMIT: usize = 10_000;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

// Column types may carry constraints ("TEXT NOT NULL", "NUMERIC(10, 2)") but no quotes or terminators.
// Commas only inside flat parentheses, so a type cannot open another column definition.
static DECLARED_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_ ]*(\([A-Za-z0-9_ ,]*\)[A-Za-z0-9_ ]*)*$").unwrap());

/// Checks that `name` is a plain SQL identifier.
///
/// `kind` only feeds the error message ("table", "column", ...).
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!("Invalid {} name: {:?}", kind, name)))
    }
}

fn validate_declared_type(column: &str, declared_type: &str) -> Result<()> {
    if DECLARED_TYPE.is_match(declared_type.trim()) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "Invalid type for column {}: {:?}",
            column, declared_type
        )))
    }
}

fn join_identifiers(kind: &str, names: &[String]) -> Result<String> {
    for name in names {
        validate_identifier(kind, name)?;
    }
    Ok(names.join(", "))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// A rendered statement: SQL text and the values bound to its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Column layout used by `create_table`.
///
/// Columns keep their insertion order. Declaring a column twice replaces the
/// earlier type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    columns: Vec<(String, String)>,
    unique: Vec<Vec<String>>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column with its declared type, e.g. `("potency", "INTEGER")`
    pub fn column(mut self, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let name = name.into();
        let declared_type = declared_type.into();
        match self.columns.iter().position(|(existing, _)| *existing == name) {
            Some(index) => self.columns[index].1 = declared_type,
            None => self.columns.push((name, declared_type)),
        }
        self
    }

    /// Adds a table-level `UNIQUE (...)` constraint over `columns`
    pub fn unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique.push(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), ty.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for TableSchema
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(TableSchema::new(), |schema, (name, ty)| schema.column(name, ty))
    }
}

/// A filter predicate with `?` placeholders and the values bound to them.
///
/// The clause text is trusted SQL written by the caller; anything that came
/// from outside must go into `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    clause: String,
    params: Vec<Value>,
}

impl Condition {
    /// Creates a condition from a clause such as `"potency > ? AND brand = ?"`
    pub fn new(clause: impl Into<String>, params: Vec<Value>) -> Self {
        Condition {
            clause: clause.into(),
            params,
        }
    }

    /// `column = ?`
    pub fn eq(column: &str, value: impl Into<Value>) -> Result<Self> {
        validate_identifier("column", column)?;
        Ok(Condition::new(format!("{} = ?", column), vec![value.into()]))
    }

    /// Equality on every `(column, value)` pair, joined with `AND`
    pub fn all_eq<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut parts = Vec::new();
        let mut params = Vec::new();
        for (column, value) in pairs {
            let column = column.as_ref();
            validate_identifier("column", column)?;
            parts.push(format!("{} = ?", column));
            params.push(value);
        }
        if parts.is_empty() {
            return Err(StoreError::Validation("Condition needs at least one column".to_string()));
        }
        Ok(Condition::new(parts.join(" AND "), params))
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// A SELECT over a single table
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    fields: Vec<String>,
    condition: Option<Condition>,
    group_by: Vec<String>,
    distinct: bool,
    limit: Option<usize>,
}

impl Select {
    /// Selects every column of `table`
    pub fn table(table: impl Into<String>) -> Self {
        Select {
            table: table.into(),
            fields: Vec::new(),
            condition: None,
            group_by: Vec::new(),
            distinct: false,
            limit: None,
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders with the row limit clamped to `cap`
    pub(crate) fn render_capped(&self, cap: usize) -> Result<Statement> {
        let limit = self.limit.map_or(cap, |limit| limit.min(cap));
        self.render_with_limit(Some(limit))
    }

    pub fn render(&self) -> Result<Statement> {
        self.render_with_limit(self.limit)
    }

    fn render_with_limit(&self, limit: Option<usize>) -> Result<Statement> {
        validate_identifier("table", &self.table)?;
        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            join_identifiers("field", &self.fields)?
        };

        let select = if self.distinct { "SELECT DISTINCT" } else { "SELECT" };
        let mut sql = format!("{} {} FROM {}", select, fields, self.table);
        let mut params = Vec::new();

        if let Some(condition) = &self.condition {
            sql.push_str(&format!(" WHERE {}", condition.clause()));
            params.extend(condition.params().iter().cloned());
        }
        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", join_identifiers("column", &self.group_by)?));
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(Statement { sql, params })
    }
}

/// `CREATE TABLE IF NOT EXISTS name (...)`
pub fn create_table_sql(table: &str, schema: &TableSchema) -> Result<String> {
    validate_identifier("table", table)?;
    if schema.is_empty() {
        return Err(StoreError::Validation("Columns cannot be empty".to_string()));
    }

    let mut definitions = Vec::new();
    for (name, declared_type) in schema.columns() {
        validate_identifier("column", name)?;
        validate_declared_type(name, declared_type)?;
        definitions.push(format!("{} {}", name, declared_type.trim()));
    }
    for columns in &schema.unique {
        if columns.is_empty() {
            return Err(StoreError::Validation("UNIQUE constraint needs at least one column".to_string()));
        }
        definitions.push(format!("UNIQUE ({})", join_identifiers("column", columns)?));
    }

    Ok(format!("CREATE TABLE IF NOT EXISTS {} ({})", table, definitions.join(", ")))
}

/// `UPDATE table SET a = ?, b = ? [WHERE ...]`
///
/// Without a condition the statement touches every row of the table.
pub fn update_statement(
    table: &str,
    assignments: &[(&str, Value)],
    condition: Option<&Condition>,
) -> Result<Statement> {
    validate_identifier("table", table)?;
    if assignments.is_empty() {
        return Err(StoreError::Validation("Update needs at least one assignment".to_string()));
    }

    let mut set_parts = Vec::with_capacity(assignments.len());
    let mut params = Vec::with_capacity(assignments.len());
    for (column, value) in assignments {
        validate_identifier("column", column)?;
        set_parts.push(format!("{} = ?", column));
        params.push(value.clone());
    }

    let mut sql = format!("UPDATE {} SET {}", table, set_parts.join(", "));
    if let Some(condition) = condition {
        sql.push_str(&format!(" WHERE {}", condition.clause()));
        params.extend(condition.params().iter().cloned());
    }

    Ok(Statement { sql, params })
}

/// `INSERT INTO table [(fields)] VALUES (?, ...)`
pub fn insert_statement(table: &str, values: &[Value], fields: Option<&[&str]>) -> Result<Statement> {
    validate_identifier("table", table)?;
    if values.is_empty() {
        return Err(StoreError::Validation("Insert needs at least one value".to_string()));
    }

    let sql = match fields {
        Some(fields) => {
            if fields.len() != values.len() {
                return Err(StoreError::Validation(format!(
                    "Insert into {} has {} fields but {} values",
                    table,
                    fields.len(),
                    values.len()
                )));
            }
            let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                join_identifiers("field", &fields)?,
                placeholders(values.len())
            )
        }
        None => format!("INSERT INTO {} VALUES ({})", table, placeholders(values.len())),
    };

    Ok(Statement {
        sql,
        params: values.to_vec(),
    })
}

/// `SELECT COUNT(*) FROM table [WHERE ...]`
pub fn count_statement(table: &str, condition: Option<&Condition>) -> Result<Statement> {
    validate_identifier("table", table)?;
    let mut sql = format!("SELECT COUNT(*) FROM {}", table);
    let mut params = Vec::new();
    if let Some(condition) = condition {
        sql.push_str(&format!(" WHERE {}", condition.clause()));
        params.extend(condition.params().iter().cloned());
    }
    Ok(Statement { sql, params })
}
