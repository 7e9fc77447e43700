//! Declaration file example.
//!
//! Writes a JSON declaration and a YAML connection config to disk, loads
//! both, reconciles and runs an advanced select.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p table-schema-examples --example declaration_file
//! ```

use table_schema_core::Record;
use table_schema_db::{ConnectionConfig, load_database};
use table_schema_sqlite::{Connector, Operator};

fn main() {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir().join("table_schema_declaration_file");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let declaration = serde_json::json!({
        "Events": {
            "fieldDefinitions": {
                "id": "INTEGER AUTOINCREMENT",
                "kind": "TEXT NOT NULL",
                "weight": "REAL DEFAULT 1"
            }
        }
    });
    std::fs::write(
        dir.join("schema.json"),
        serde_json::to_string_pretty(&declaration).unwrap(),
    )
    .unwrap();

    let mut config = ConnectionConfig::new(dir.join("events.db"));
    config.declaration = Some(dir.join("schema.json"));
    config.auto_commit.enabled = true;
    config.save(dir.join("connection.yaml")).unwrap();

    let config = ConnectionConfig::load(dir.join("connection.yaml")).unwrap();
    let schema = load_database(config.declaration.as_ref().unwrap()).unwrap();

    let mut connector = Connector::from_config(&config, schema);
    connector.connect().unwrap();
    println!("{:?}", connector.validate_tables().unwrap());

    let mut op = Operator::with_auto_commit(&mut connector, config.auto_commit);
    for (kind, weight) in [("click", 1.0), ("view", 0.5), ("click", 2.0)] {
        op.insert(
            "Events",
            &Record::new().with("kind", kind).with("weight", weight),
            None,
        )
        .unwrap();
    }

    let totals = op
        .select_advanced(
            "kind, SUM(weight) AS total",
            "Events",
            Some("GROUP BY kind ORDER BY total DESC"),
        )
        .unwrap();
    println!("{}", serde_json::to_string_pretty(&totals).unwrap());

    drop(op);
    connector.close().unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}
