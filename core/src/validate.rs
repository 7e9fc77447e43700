//! Structural validation of tables and databases.
//!
//! Checks the invariants a table must satisfy before it is reconciled
//! against a live database: one primary key source at most, primary keys
//! that reference declared fields, and unique field names.
//!
//! # Examples
//!
//! ```
//! use table_schema_core::*;
//!
//! let table = Table {
//!     name: "T".into(),
//!     fields: vec![Field::parse("id", "INTEGER AUTOINCREMENT").unwrap()],
//!     primary_keys: vec!["id".into()],
//! };
//! assert_eq!(validate_table(&table), vec![ValidationError::MultiplePrimaryKeys]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Database, Table};

/// Table validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Both an explicit primary key and an auto-increment field are declared.
    #[error("multiple primary key sources")]
    MultiplePrimaryKeys,
    /// More than one field is marked `AUTOINCREMENT`.
    #[error("more than one AUTOINCREMENT field")]
    MultipleAutoIncrement,
    /// A primary key name does not match any declared field.
    #[error("primary key '{0}' is not a declared field")]
    UnknownPrimaryKey(String),
    /// Two fields share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    /// The table declares no fields.
    #[error("table declares no fields")]
    EmptyTable,
}

/// Validates a single table, returning every problem found.
pub fn validate_table(table: &Table) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if table.fields.is_empty() {
        errors.push(ValidationError::EmptyTable);
    }

    let mut seen = HashSet::new();
    for field in &table.fields {
        if !seen.insert(field.name.as_str()) {
            errors.push(ValidationError::DuplicateField(field.name.clone()));
        }
    }

    let auto_increment = table.fields.iter().filter(|f| f.auto_increment).count();
    if auto_increment > 1 {
        errors.push(ValidationError::MultipleAutoIncrement);
    }
    if auto_increment > 0 && !table.primary_keys.is_empty() {
        errors.push(ValidationError::MultiplePrimaryKeys);
    }

    for key in &table.primary_keys {
        if !seen.contains(key.as_str()) {
            errors.push(ValidationError::UnknownPrimaryKey(key.clone()));
        }
    }

    errors
}

/// Validates every table of a database.
///
/// Returns `(table name, error)` pairs in declaration order.
pub fn validate_database(db: &Database) -> Vec<(String, ValidationError)> {
    db.tables()
        .iter()
        .flat_map(|t| {
            validate_table(t)
                .into_iter()
                .map(move |e| (t.name.clone(), e))
        })
        .collect()
}
