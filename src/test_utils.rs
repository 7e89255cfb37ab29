/// # Test Utilities Module
///
/// Fixtures shared by the unit tests: an isolated store file in a temporary
/// directory, optionally with the `tobaccos` table and a few sample rows.

use crate::core::db::DatabaseExecutor;
use crate::core::Result;
use crate::inventory::{tobacco_schema, TOBACCO_TABLE};
use rusqlite::types::Value;
use tempfile::TempDir;

/// Isolated database test fixture
///
/// The handle is open for the lifetime of the fixture; the directory is
/// removed when the fixture is dropped.
pub struct DatabaseFixture {
    pub db: DatabaseExecutor,
    pub dir: TempDir,
}

impl DatabaseFixture {
    /// Open handle on an empty store
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let mut db = DatabaseExecutor::at_path(dir.path().join("fixture.db"));
        db.open()?;
        Ok(DatabaseFixture { db, dir })
    }

    /// Store with an empty `tobaccos` table
    pub fn with_table() -> Result<Self> {
        let mut fixture = Self::new()?;
        fixture.db.create_table(TOBACCO_TABLE, &tobacco_schema())?;
        Ok(fixture)
    }

    /// `tobaccos` with three rows over two brands
    pub fn with_sample_data() -> Result<Self> {
        let mut fixture = Self::with_table()?;
        let rows = [
            ("darkside", "mint", "fresh", 7),
            ("darkside", "cola", "sweet", 7),
            ("musthave", "pinkman", "berry", 5),
        ];

        for (brand, aroma, taste, potency) in rows {
            fixture.db.insert(
                TOBACCO_TABLE,
                &[
                    Value::Text(brand.to_string()),
                    Value::Text(aroma.to_string()),
                    Value::Text(taste.to_string()),
                    Value::Integer(potency),
                ],
                None,
            )?;
        }

        Ok(fixture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_fixture_creation() {
        let fixture = DatabaseFixture::new().unwrap();
        assert!(fixture.db.is_open());
        assert!(fixture.db.path().starts_with(fixture.dir.path()));
    }

    #[test]
    fn test_sample_data_fixture() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        assert_eq!(fixture.db.count(TOBACCO_TABLE, None).unwrap(), 3);
    }
}
