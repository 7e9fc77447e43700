//! Conversion between application values and SQLite storage values.
//!
//! Writing dispatches on the field's declared storage kind; there is no
//! silent coercion between kinds other than widening an integer into a
//! `REAL` field. Reading is the identity over the engine's storage classes.

use rusqlite::types::{Value as SqlValue, ValueRef};
use table_schema_core::{Field, FieldType, Value};

use crate::error::{Result, SqliteError};

/// Converts an application value for storage in `field`.
///
/// `Null` binds SQL `NULL` for every kind; whether that is accepted is up to
/// the field's `NOT NULL` constraint.
///
/// # Errors
///
/// Returns [`SqliteError::ConversionError`] when the value's kind does not
/// match the field's declared kind.
///
/// # Examples
///
/// ```
/// use table_schema_core::{Field, FieldType, Value};
/// use table_schema_sqlite::to_storage;
/// use rusqlite::types::Value as SqlValue;
///
/// let field = Field::new("score", FieldType::Real);
/// assert_eq!(to_storage(&field, &Value::Integer(3)).unwrap(), SqlValue::Real(3.0));
/// assert!(to_storage(&field, &Value::Text("3".into())).is_err());
/// ```
pub fn to_storage(field: &Field, value: &Value) -> Result<SqlValue> {
    let stored = match (field.kind, value) {
        (_, Value::Null) => SqlValue::Null,
        (FieldType::Integer, Value::Integer(i)) => SqlValue::Integer(*i),
        (FieldType::Real, Value::Real(f)) => SqlValue::Real(*f),
        (FieldType::Real, Value::Integer(i)) => SqlValue::Real(*i as f64),
        (FieldType::Text, Value::Text(s)) => SqlValue::Text(s.clone()),
        (FieldType::Blob, Value::Blob(b)) => SqlValue::Blob(b.clone()),
        (kind, other) => {
            return Err(SqliteError::ConversionError(format!(
                "field '{}' of type {kind} cannot store a {} value",
                field.name,
                other.kind_name()
            )));
        }
    };
    Ok(stored)
}

/// Converts a stored value back into an application value.
///
/// # Errors
///
/// Returns [`SqliteError::ConversionError`] if a `TEXT` value is not valid
/// UTF-8.
pub fn from_storage(value: ValueRef<'_>) -> Result<Value> {
    let converted = match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| SqliteError::ConversionError(format!("invalid UTF-8 text: {e}")))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    };
    Ok(converted)
}
