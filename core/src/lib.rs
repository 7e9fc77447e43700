//! Declarative table schemas for an embedded SQL database.
//!
//! This crate defines the database-independent half of the workspace:
//!
//! - [`parse_field`]: the compact field grammar
//!   (`"INTEGER NOT NULL AUTOINCREMENT DEFAULT 3"`).
//! - [`Field`], [`Table`], [`Database`]: the in-memory schema model.
//! - [`SchemaDeclaration`], [`TableDeclaration`]: the serializable
//!   declaration format the model is built from.
//! - [`Value`], [`Record`]: application values passed to and returned by
//!   CRUD operations.
//!
//! Validation ([`validate_table`], [`validate_database`]) catches structural
//! errors such as two primary key sources or primary keys that name no field.
//!
//! # Example
//!
//! ```
//! use table_schema_core::*;
//!
//! let decl = SchemaDeclaration::new()
//!     .table(
//!         "BasicTable",
//!         TableDeclaration::new()
//!             .field("id", "INTEGER AUTOINCREMENT")
//!             .field("name", "TEXT UNIQUE NOT NULL")
//!             .field("time", "REAL"),
//!     )
//!     .table(
//!         "test_table",
//!         TableDeclaration::new()
//!             .field("id", "INT NOT NULL")
//!             .field("hell", "BLOB")
//!             .primary_keys(["id", "hell"]),
//!     );
//!
//! let db = Database::from_declaration(&decl).unwrap();
//! let basic = db.table("BasicTable").unwrap();
//! assert!(basic.field("name").unwrap().unique);
//! assert!(validate_database(&db).is_empty());
//! ```

mod declaration;
mod error;
mod grammar;
mod model;
mod ordered;
mod types;
mod validate;

pub use declaration::{PrimaryKeys, SchemaDeclaration, TableDeclaration};
pub use error::{Result, SchemaError};
pub use grammar::{
    AUTO_INCREMENT_TOKEN, DEFAULT_TOKEN, NOT_NULL_TOKEN, UNIQUE_TOKEN, parse_field,
};
pub use model::{Database, Field, PrimaryKeySource, Table};
pub use ordered::{OrderedMap, Record};
pub use types::{FieldType, Value};
pub use validate::{ValidationError, validate_database, validate_table};
