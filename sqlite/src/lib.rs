//! SQLite backend for declared table schemas.
//!
//! This crate reconciles a [`Database`](table_schema_core::Database) model
//! against a live SQLite file and builds CRUD statements from it.
//!
//! # Architecture
//!
//! - **`connector`**: connection lifecycle, reconciliation, structure loading
//! - **`introspect`**: reads tables and columns back out of `sqlite_master`
//!   and `PRAGMA table_info`
//! - **`schema`**: `CREATE TABLE` / `ALTER TABLE ADD COLUMN` generation
//! - **`layout`**: live column positions resolved during reconciliation
//! - **`statement`**: insert/update/delete/select statement text
//! - **`convert`**: application values to and from storage values
//! - **`operator`**: executes statements with optional automatic commits
//!
//! # Quick start
//!
//! ```no_run
//! use table_schema_core::Record;
//! use table_schema_db::load_database;
//! use table_schema_sqlite::{Connector, Operator};
//!
//! let schema = load_database("schema.yaml").unwrap();
//! let mut connector = Connector::new("app.db", schema);
//! connector.connect().unwrap();
//! connector.validate_tables().unwrap();
//!
//! let mut op = Operator::new(&mut connector);
//! op.insert("T", &Record::new().with("name", "a"), Some("OR IGNORE")).unwrap();
//! println!("{:?}", op.last_insert_rowid());
//! ```
//!
//! # Trusted fragments
//!
//! Conflict policies, `WHERE` conditions and advanced select clauses are
//! inserted into statement text verbatim. Table and field names from the
//! schema model are checked to be plain identifiers before any DDL is run;
//! record values are always bound as parameters.

mod connector;
mod convert;
mod error;
mod introspect;
mod layout;
mod operator;
mod schema;
mod statement;

pub use connector::{Connector, ReconcileReport};
pub use convert::{from_storage, to_storage};
pub use error::{Result, SqliteError};
pub use introspect::{ColumnInfo, field_from_column, load_table, table_columns, table_exists, table_names};
pub use layout::ColumnLayout;
pub use operator::Operator;
pub use schema::{add_column_sql, create_table_sql};
pub use statement::{
    Fields, advanced_select_sql, delete_sql, insert_sql, select_sql, update_sql,
};
