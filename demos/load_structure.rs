//! Structure loading example.
//!
//! Builds a database by hand, then bootstraps a schema model from it with
//! `load_structure_from_database` and prints the equivalent declaration.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p table-schema-examples --example load_structure
//! ```

use rusqlite::Connection;
use table_schema_core::Database;
use table_schema_sqlite::Connector;

fn main() {
    tracing_subscriber::fmt::init();

    let path = std::env::temp_dir().join("table_schema_load_structure.db");
    let _ = std::fs::remove_file(&path);
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Authors (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
             CREATE TABLE Books (author INTEGER, title TEXT, pages INT DEFAULT 0,
                                 PRIMARY KEY (author, title));",
        )
        .unwrap();
    }

    let mut connector = Connector::new(&path, Database::new()).with_create_if_missing(false);
    connector.connect().unwrap();
    connector.load_structure_from_database().unwrap();

    for table in connector.schema().tables() {
        println!("{}:", table.name);
        for field in &table.fields {
            let index = connector.layout().index_of(&table.name, &field.name);
            println!("  [{index:?}] {} {}", field.name, field.declaration());
        }
        println!("  primary key: {:?}", table.primary_key_source());
    }

    let declaration = connector.schema().to_declaration();
    println!("\n{}", serde_json::to_string_pretty(&declaration).unwrap());

    connector.close().unwrap();
    let _ = std::fs::remove_file(&path);
}
