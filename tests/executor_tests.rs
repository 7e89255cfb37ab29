use hookah_store::core::db::{
    create_table_sql, insert_statement, update_statement, Condition, DatabaseExecutor, InsertOutcome, Select,
    TableSchema,
};
use hookah_store::core::StoreError;
use hookah_store::inventory::tobacco_schema;
use insta::assert_snapshot;
use rusqlite::types::Value;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn brand_a() -> Vec<Value> {
    vec![text("Brand A"), text("mint"), text("sweet"), Value::Integer(3)]
}

fn scenario_schema() -> TableSchema {
    TableSchema::new()
        .column("mark", "TEXT UNIQUE")
        .column("aroma", "TEXT")
        .column("flavour", "TEXT")
        .column("potency", "INTEGER")
}

#[test]
fn test_brand_a_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let result = DatabaseExecutor::at_path(dir.path().join("hookah.db")).scoped(|db| {
        db.create_table("tobaccos", &scenario_schema())?;

        let first = db.insert("tobaccos", &brand_a(), None)?;
        assert_eq!(first, InsertOutcome::Inserted { rowid: 1 });

        let by_mark = Select::table("tobaccos").condition(Condition::eq("mark", text("Brand A"))?);
        assert_eq!(db.fetch_one(&by_mark)?, Some(brand_a()));

        let again = db.insert("tobaccos", &brand_a(), None)?;
        assert!(again.is_conflict());
        assert_eq!(db.count("tobaccos", None)?, 1);
        Ok(())
    });
    result.unwrap();
}

#[test]
fn test_store_survives_between_scopes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hookah.db");

    DatabaseExecutor::at_path(&path)
        .scoped(|db| {
            db.create_table("tobaccos", &scenario_schema())?;
            db.insert("tobaccos", &brand_a(), None).map(|_| ())
        })
        .unwrap();

    let rows = DatabaseExecutor::at_path(&path)
        .scoped(|db| {
            // Second create on an existing table is a no-op
            db.create_table("tobaccos", &scenario_schema())?;
            db.fetch_all(&Select::table("tobaccos"))
        })
        .unwrap();
    assert_eq!(rows, vec![brand_a()]);
}

#[test]
fn test_update_counts_on_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = DatabaseExecutor::at_path(dir.path().join("hookah.db"));
    db.open().unwrap();
    db.create_table("tobaccos", &scenario_schema()).unwrap();
    for mark in ["Brand A", "Brand B", "Brand C"] {
        db.insert("tobaccos", &[text(mark), text("mint"), text("sweet"), Value::Integer(1)], None)
            .unwrap();
    }

    let only_b = Condition::eq("mark", text("Brand B")).unwrap();
    assert_eq!(db.update("tobaccos", &[("potency", Value::Integer(5))], Some(&only_b)).unwrap(), 1);
    let strong = Condition::new("potency > ?", vec![Value::Integer(4)]);
    assert_eq!(db.count("tobaccos", Some(&strong)).unwrap(), 1);

    assert_eq!(db.update("tobaccos", &[("potency", Value::Integer(8))], None).unwrap(), 3);
    assert_eq!(db.count("tobaccos", Some(&strong)).unwrap(), 3);
}

#[test]
fn test_closed_handle_does_no_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.db");
    let mut db = DatabaseExecutor::at_path(&path);

    let result = db.create_table("tobaccos", &scenario_schema());
    assert!(matches!(result, Err(StoreError::Usage(_))));
    assert!(matches!(db.fetch_many(&Select::table("tobaccos")), Err(StoreError::Usage(_))));
    assert!(!path.exists());
}

#[test]
fn test_fetch_many_respects_explicit_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = DatabaseExecutor::at_path(dir.path().join("hookah.db"));
    db.open().unwrap();
    db.create_table("tobaccos", &scenario_schema()).unwrap();
    for i in 0..5 {
        db.insert("tobaccos", &[text(&format!("mark {}", i)), text("a"), text("b"), Value::Null], None)
            .unwrap();
    }

    assert_eq!(db.fetch_many(&Select::table("tobaccos").limit(2)).unwrap().len(), 2);
    assert_eq!(db.fetch_all(&Select::table("tobaccos")).unwrap().len(), 5);
}

#[test]
fn test_rendered_sql() {
    assert_snapshot!(
        create_table_sql("tobaccos", &tobacco_schema()).unwrap(),
        @"CREATE TABLE IF NOT EXISTS tobaccos (brand TEXT NOT NULL, aroma TEXT NOT NULL, taste TEXT, potency INTEGER, UNIQUE (brand, aroma))"
    );

    let statement = insert_statement(
        "tobaccos",
        &[text("darkside"), text("mint"), text("fresh"), Value::Integer(7)],
        Some(&["brand", "aroma", "taste", "potency"]),
    )
    .unwrap();
    assert_snapshot!(statement.sql, @"INSERT INTO tobaccos (brand, aroma, taste, potency) VALUES (?, ?, ?, ?)");

    let statement = update_statement("tobaccos", &[("potency", Value::Integer(1))], None).unwrap();
    assert_snapshot!(statement.sql, @"UPDATE tobaccos SET potency = ?");

    let statement = Select::table("tobaccos")
        .fields(["brand"])
        .distinct()
        .render()
        .unwrap();
    assert_snapshot!(statement.sql, @"SELECT DISTINCT brand FROM tobaccos");
}
