#![allow(dead_code)]

use fql_store::{datetime, integer, text, Catalog, Db, DbOptions, Record, Value};

/// Builds a fresh in-memory database with the test schema.
///
/// The pool is limited to one connection so every session sees the same
/// in-memory SQLite instance.
pub async fn test_db() -> Db {
    let mut catalog = Catalog::new();
    catalog
        .register(
            fql_store::TableSchema::new("test_table")
                .column(integer("id").primary_key())
                .column(text("key"))
                .column(text("value")),
        )
        .unwrap();
    catalog
        .register(
            fql_store::TableSchema::new("test_table2")
                .column(integer("id").primary_key())
                .column(text("key"))
                .column(text("value")),
        )
        .unwrap();
    catalog
        .register(
            fql_store::TableSchema::new("test_table3")
                .column(integer("id").primary_key())
                .column(text("key"))
                .column(integer("table2").references("test_table2")),
        )
        .unwrap();
    catalog
        .register(
            fql_store::TableSchema::new("jobs")
                .column(integer("id").primary_key())
                .column(text("state").not_null())
                .column(datetime("last_state_change"))
                .column(text("payload")),
        )
        .unwrap();

    let mut options = DbOptions::new("sqlite::memory:");
    options.max_connections = 1;
    let db = Db::connect(&options, catalog).await.unwrap();

    for ddl in [
        "CREATE TABLE test_table (id INTEGER PRIMARY KEY, key TEXT, value TEXT)",
        "CREATE TABLE test_table2 (id INTEGER PRIMARY KEY, key TEXT, value TEXT)",
        "CREATE TABLE test_table3 (id INTEGER PRIMARY KEY, key TEXT, \
         table2 INTEGER REFERENCES test_table2(id))",
        "CREATE TABLE jobs (id INTEGER PRIMARY KEY, state TEXT NOT NULL, \
         last_state_change TEXT, payload TEXT)",
    ] {
        sqlx::query(ddl).execute(db.pool()).await.unwrap();
    }

    db
}

/// Builds a record from field/value pairs.
pub fn record<const N: usize>(pairs: [(&str, Value); N]) -> Record {
    pairs
        .into_iter()
        .map(|(field, value)| (String::from(field), value))
        .collect()
}

/// Extracts a text field from every record, in order.
pub fn texts(records: &[Record], field: &str) -> Vec<String> {
    records
        .iter()
        .map(|r| String::from(r[field].as_text().unwrap()))
        .collect()
}

/// Extracts the id field from every record, in order.
pub fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().map(|r| r["id"].as_int().unwrap()).collect()
}
