//! Error types for declaration loading and configuration.
//!
//! Provides a unified error type covering I/O, serialization and schema
//! construction failures.

use std::path::PathBuf;

use table_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading declarations or configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file extension is not `.json`, `.yaml` or `.yml`.
    #[error("unsupported declaration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The same table is declared in more than one file.
    #[error("table '{table}' declared again in {path}")]
    DuplicateTable {
        /// Table name.
        table: String,
        /// File containing the second declaration.
        path: PathBuf,
    },

    /// A declaration could not be turned into a schema model.
    #[error("schema error: {0}")]
    SchemaError(#[from] SchemaError),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
