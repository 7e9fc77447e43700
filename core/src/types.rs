//! Storage kinds and application values.
//!
//! [`FieldType`] is the closed set of column kinds a declaration may use, and
//! [`Value`] is the matching tagged value passed in and out of records. Both
//! are closed on purpose: adding a kind means adding a conversion arm
//! everywhere it is matched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Storage kind of a declared field.
///
/// # Examples
///
/// ```
/// use table_schema_core::FieldType;
///
/// assert_eq!(FieldType::parse("int").unwrap(), FieldType::Integer);
/// assert_eq!(FieldType::parse("INTEGER").unwrap(), FieldType::Integer);
/// assert!(FieldType::parse("VARCHAR").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed 64-bit integer (`INT` / `INTEGER`).
    Integer,
    /// UTF-8 text (`TEXT`).
    Text,
    /// 64-bit float (`REAL`).
    Real,
    /// Raw bytes (`BLOB`).
    Blob,
}

impl FieldType {
    /// Parses a declared base type token, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedType`] for anything other than
    /// `INT`, `INTEGER`, `TEXT`, `REAL` or `BLOB`.
    pub fn parse(token: &str) -> Result<Self> {
        match token.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Ok(Self::Integer),
            "TEXT" => Ok(Self::Text),
            "REAL" => Ok(Self::Real),
            "BLOB" => Ok(Self::Blob),
            _ => Err(SchemaError::UnsupportedType(token.to_string())),
        }
    }

    /// Maps a live column's declared type onto a storage kind using the
    /// engine's column-affinity rules.
    ///
    /// Only used for introspected columns, whose declared types are not
    /// restricted to the declaration grammar.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedType`] for NUMERIC affinity
    /// (e.g. `DATETIME`, `DECIMAL`), which has no matching kind.
    pub fn from_affinity(declared: &str) -> Result<Self> {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Ok(Self::Integer)
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Ok(Self::Text)
        } else if upper.contains("BLOB") || upper.trim().is_empty() {
            Ok(Self::Blob)
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Ok(Self::Real)
        } else {
            Err(SchemaError::UnsupportedType(declared.to_string()))
        }
    }

    /// Canonical SQL spelling of the kind.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// An application-side value stored in or read from a field.
///
/// Serialized untagged, so a JSON record such as
/// `{"id": 1, "name": "a", "score": 1.5, "note": null}` maps directly onto
/// values. Blobs serialize as arrays of bytes.
///
/// # Examples
///
/// ```
/// use table_schema_core::Value;
///
/// assert_eq!(Value::from(3), Value::Integer(3));
/// assert_eq!(Value::from("a"), Value::Text("a".into()));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Byte string.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's variant, used in conversion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Returns the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
