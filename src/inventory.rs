//! Tobacco inventory operations built on the query executor.
//!
//! Each operation opens its own scoped connection, makes sure the
//! `tobaccos` table exists, does its work and closes the connection again.
use crate::config::Config;
use crate::core::db::{Condition, DatabaseExecutor, InsertOutcome, Row, Select, TableSchema};
use crate::core::{Result, StoreError};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

pub const TOBACCO_TABLE: &str = "tobaccos";

const TOBACCO_FIELDS: [&str; 4] = ["brand", "aroma", "taste", "potency"];

/// Placeholder stored when a request leaves out flavour or taste
pub const UNKNOWN: &str = "unknown";

/// Layout of the `tobaccos` table; a brand carries each aroma at most once
pub fn tobacco_schema() -> TableSchema {
    TableSchema::new()
        .column("brand", "TEXT NOT NULL")
        .column("aroma", "TEXT NOT NULL")
        .column("taste", "TEXT")
        .column("potency", "INTEGER")
        .unique(["brand", "aroma"])
}

/// One row of the `tobaccos` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tobacco {
    pub brand: String,
    pub aroma: String,
    pub taste: Option<String>,
    pub potency: Option<i64>,
}

impl Tobacco {
    /// Builds a record from a row selected with `TOBACCO_FIELDS`
    fn from_row(row: &[Value]) -> Result<Self> {
        match row {
            [brand, aroma, taste, potency] => Ok(Tobacco {
                brand: required_text("brand", brand)?,
                aroma: required_text("aroma", aroma)?,
                taste: optional_text("taste", taste)?,
                potency: match potency {
                    Value::Null => None,
                    Value::Integer(i) => Some(*i),
                    other => {
                        return Err(StoreError::Validation(format!(
                            "Unexpected potency value: {:?}",
                            other
                        )))
                    }
                },
            }),
            _ => Err(StoreError::Validation(format!(
                "Expected {} columns, got {}",
                TOBACCO_FIELDS.len(),
                row.len()
            ))),
        }
    }
}

fn optional_text(column: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(t) => Ok(Some(t.clone())),
        other => Err(StoreError::Validation(format!(
            "Unexpected {} value: {:?}",
            column, other
        ))),
    }
}

fn required_text(column: &str, value: &Value) -> Result<String> {
    optional_text(column, value)?
        .ok_or_else(|| StoreError::Validation(format!("Column {} is NULL", column)))
}

fn into_tobaccos(rows: Vec<Row>) -> Result<Vec<Tobacco>> {
    rows.iter().map(|row| Tobacco::from_row(row)).collect()
}

/// A flavour listed under a brand in an add request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TobaccoEntry {
    pub flavour: Option<String>,
    pub taste: Option<String>,
}

/// Add request body: brand → flavours of that brand.
///
/// ```json
/// { "darkside": [ { "flavour": "mint", "taste": "fresh" } ] }
/// ```
pub type AddRequest = BTreeMap<String, Vec<TobaccoEntry>>;

/// Outcome of a batch add
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddReport {
    pub added: usize,
    /// One description per rejected duplicate
    pub conflicts: Vec<String>,
}

impl AddReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

fn normalize(value: Option<&str>) -> String {
    value.unwrap_or(UNKNOWN).trim().to_lowercase()
}

/// Inventory over the store described by a `Config`
#[derive(Debug, Default)]
pub struct Inventory {
    config: Config,
}

impl Inventory {
    pub fn new(config: Config) -> Self {
        Inventory { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs `body` inside a fresh connection scope with the table in place
    fn with_store<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&mut DatabaseExecutor) -> Result<T>,
    {
        DatabaseExecutor::with_config(&self.config.database).scoped(|db| {
            db.create_table(TOBACCO_TABLE, &tobacco_schema())?;
            body(db)
        })
    }

    /// Creates the store file and the `tobaccos` table
    pub fn init(&self) -> Result<()> {
        self.with_store(|_| Ok(()))?;
        info!("Initialized store at {}", self.config.database.path().display());
        Ok(())
    }

    /// Inserts every flavour of every brand in `request`.
    ///
    /// Brand, flavour and taste are lowercased; a missing flavour or taste is
    /// stored as `"unknown"`. Duplicates do not stop the batch, they are
    /// collected in the report.
    pub fn add_tobaccos(&self, request: &AddRequest) -> Result<AddReport> {
        self.with_store(|db| {
            let mut report = AddReport::default();
            for (brand, entries) in request {
                let brand = normalize(Some(brand));
                let potency = self.config.potency_for(&brand);
                for entry in entries {
                    let values = [
                        Value::Text(brand.clone()),
                        Value::Text(normalize(entry.flavour.as_deref())),
                        Value::Text(normalize(entry.taste.as_deref())),
                        Value::Integer(potency),
                    ];
                    match db.insert(TOBACCO_TABLE, &values, Some(&TOBACCO_FIELDS[..]))? {
                        InsertOutcome::Inserted { .. } => report.added += 1,
                        InsertOutcome::Conflict { detail } => report.conflicts.push(detail),
                    }
                }
            }
            info!(
                added = report.added,
                conflicts = report.conflicts.len(),
                "Added tobaccos"
            );
            Ok(report)
        })
    }

    /// Up to `FETCH_MANY_LIMIT` tobaccos
    pub fn list(&self) -> Result<Vec<Tobacco>> {
        self.with_store(|db| into_tobaccos(db.fetch_many(&Select::table(TOBACCO_TABLE).fields(TOBACCO_FIELDS))?))
    }

    /// Every tobacco of the brand (mark) `mark`
    pub fn by_mark(&self, mark: &str) -> Result<Vec<Tobacco>> {
        let condition = Condition::eq("brand", Value::Text(normalize(Some(mark))))?;
        self.with_store(|db| {
            into_tobaccos(db.fetch_many(
                &Select::table(TOBACCO_TABLE)
                    .fields(TOBACCO_FIELDS)
                    .condition(condition),
            )?)
        })
    }

    /// Distinct brand names
    pub fn brands(&self) -> Result<Vec<String>> {
        self.with_store(|db| {
            db.fetch_all(&Select::table(TOBACCO_TABLE).fields(["brand"]).distinct())?
                .iter()
                .map(|row| match row.first() {
                    Some(value) => required_text("brand", value),
                    None => Err(StoreError::Validation("Empty brand row".to_string())),
                })
                .collect()
        })
    }
}
