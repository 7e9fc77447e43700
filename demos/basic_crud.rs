//! Basic CRUD example.
//!
//! Declares a table, reconciles it against a fresh database file and runs
//! insert, update, select and delete through an [`Operator`].
//!
//! # Usage
//!
//! ```bash
//! cargo run -p table-schema-examples --example basic_crud
//! ```

use table_schema_core::{Database, Record, SchemaDeclaration, TableDeclaration, Value};
use table_schema_sqlite::{Connector, Operator};

fn main() {
    tracing_subscriber::fmt::init();

    let path = std::env::temp_dir().join("table_schema_basic_crud.db");
    let _ = std::fs::remove_file(&path);

    let declaration = SchemaDeclaration::new().table(
        "BasicTable",
        TableDeclaration::new()
            .field("id", "INTEGER AUTOINCREMENT")
            .field("name", "TEXT UNIQUE NOT NULL")
            .field("time", "REAL NOT NULL")
            .field("avatar", "BLOB"),
    );
    let schema = Database::from_declaration(&declaration).unwrap();

    let mut connector = Connector::new(&path, schema);
    connector.connect().unwrap();
    let report = connector.validate_tables().unwrap();
    println!("Created tables: {:?}", report.tables_created);

    let mut op = Operator::new(&mut connector);
    for (name, time) in [("ssc", 1.0), ("aka", 2.5), ("zed", 4.0)] {
        let row = Record::new()
            .with("name", name)
            .with("time", time)
            .with("avatar", Value::Null);
        op.insert("BasicTable", &row, None).unwrap();
        println!("Inserted {name} as row {:?}", op.last_insert_rowid());
    }

    let changed = op
        .update(
            "BasicTable",
            &Record::new().with("avatar", vec![0x89u8, 0x50, 0x4e, 0x47]),
            Some("name = 'aka'"),
        )
        .unwrap();
    println!("Updated {changed} row(s)");

    println!("\nAll rows:");
    for row in op.select("*", "BasicTable", None).unwrap() {
        println!("  {row:?}");
    }

    println!("\nNames with time > 2:");
    for row in op.select(["name"], "BasicTable", Some("time > 2")).unwrap() {
        println!("  {}", row.get("name").and_then(Value::as_str).unwrap_or("?"));
    }

    let deleted = op.delete("BasicTable", Some("id == 1")).unwrap();
    println!("\nDeleted {deleted} row(s)");
    op.commit().unwrap();

    drop(op);
    connector.close().unwrap();
    let _ = std::fs::remove_file(&path);
}
