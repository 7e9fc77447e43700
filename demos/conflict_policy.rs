//! Conflict policy example.
//!
//! Shows how a uniqueness violation surfaces as an engine error and how the
//! `OR IGNORE` / `OR REPLACE` policies change insert behavior. Also runs
//! with periodic automatic commits enabled.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p table-schema-examples --example conflict_policy
//! ```

use table_schema_core::{Database, Record, SchemaDeclaration, TableDeclaration};
use table_schema_db::AutoCommitConfig;
use table_schema_sqlite::{Connector, Operator};

fn main() {
    tracing_subscriber::fmt::init();

    let declaration = SchemaDeclaration::new().table(
        "Settings",
        TableDeclaration::new()
            .field("name", "TEXT NOT NULL")
            .field("setting", "TEXT")
            .primary_key("name"),
    );
    let mut connector = Connector::new(":memory:", Database::from_declaration(&declaration).unwrap());
    connector.connect().unwrap();
    connector.validate_tables().unwrap();

    let mut op = Operator::with_auto_commit(
        &mut connector,
        AutoCommitConfig {
            enabled: true,
            interval: 2,
        },
    );

    let theme = Record::new().with("name", "theme").with("setting", "dark");
    op.insert("Settings", &theme, None).unwrap();

    match op.insert("Settings", &theme, None) {
        Ok(()) => println!("unexpected: duplicate accepted"),
        Err(err) => println!("Plain insert of a duplicate key fails: {err}"),
    }

    op.insert("Settings", &theme.clone().with("setting", "light"), Some("OR IGNORE"))
        .unwrap();
    println!("After OR IGNORE:  {:?}", op.select("*", "Settings", None).unwrap());

    op.insert("Settings", &theme.with("setting", "light"), Some("OR REPLACE"))
        .unwrap();
    println!("After OR REPLACE: {:?}", op.select("*", "Settings", None).unwrap());

    println!("Changes pending since last automatic commit: {}", op.pending_changes());
}
