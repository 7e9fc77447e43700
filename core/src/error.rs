//! Error types for schema declaration and construction.

use thiserror::Error;

use crate::validate::ValidationError;

/// Errors raised while parsing field declarations or building a schema model.
///
/// All of these are structural: they are reported synchronously at
/// construction time and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Nothing was left to use as a base type once the modifiers were removed.
    #[error("invalid field type for '{field}': {declaration:?}")]
    InvalidFieldType {
        /// Name of the field being declared.
        field: String,
        /// The declaration string as written.
        declaration: String,
    },

    /// The base type token is not one of the supported storage kinds.
    #[error("not supported data type: {0}")]
    UnsupportedType(String),

    /// `DEFAULT` was present without a value following it.
    #[error("missing value after DEFAULT for field '{field}'")]
    MissingDefault {
        /// Name of the field being declared.
        field: String,
    },

    /// A table violates a structural invariant.
    #[error("invalid table '{table}': {source}")]
    Invalid {
        /// Table the problem was found in.
        table: String,
        /// The first problem found.
        #[source]
        source: ValidationError,
    },

    /// A table with the same name is already part of the database.
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
