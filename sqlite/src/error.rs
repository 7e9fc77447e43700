//! Error types for SQLite reconciliation and CRUD operations.
//!
//! Provides a unified error type covering database access, schema
//! declaration, value conversion and lookup failures. Errors reported by
//! the engine itself (constraint violations and the like) are carried
//! unchanged in [`SqliteError::DatabaseError`].

use std::path::PathBuf;

use table_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur during SQLite schema operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure, as reported by the engine.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Malformed declaration or structurally invalid table.
    #[error("schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// Application value does not fit the field's storage kind.
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// Table or column name contains characters that cannot be
    /// interpolated into a statement.
    #[error("invalid identifier '{0}': must be alphanumeric or underscore and not start with a digit")]
    InvalidIdentifier(String),

    /// Table is not part of the schema model.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Field is not declared on the table.
    #[error("unknown field '{field}' in table '{table}'")]
    UnknownField {
        /// Table name.
        table: String,
        /// Field name that failed to resolve.
        field: String,
    },

    /// Field has no live column index; the table has not been reconciled.
    #[error("field '{field}' of table '{table}' has no resolved column index")]
    UnresolvedColumn {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
    },

    /// A table with this name is already registered.
    #[error("trying to add an existing table: {0}")]
    DuplicateTable(String),

    /// Update called with no fields to set.
    #[error("no fields to update in table: {0}")]
    EmptyRecord(String),

    /// The database file does not exist and creation is disabled.
    #[error("no database file at {0}")]
    DatabaseMissing(PathBuf),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
