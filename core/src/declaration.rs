//! Serializable declaration format.
//!
//! A declaration maps table names to blocks of field definitions written in
//! the compact grammar, plus an optional primary key:
//!
//! ```yaml
//! BasicTable:
//!   field_definitions:
//!     id: INTEGER AUTOINCREMENT
//!     name: TEXT NOT NULL
//!     time: REAL
//! test_table:
//!   field_definitions:
//!     id: INT NOT NULL
//!     hell: BLOB
//!   primary_keys: [id, hell]
//! ```
//!
//! Document order is preserved for both tables and fields.

use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;

/// Primary key as written: a single field name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKeys {
    /// One field name.
    Single(String),
    /// Zero or more field names; an empty list means no primary key.
    Many(Vec<String>),
}

impl PrimaryKeys {
    /// Normalizes into a list of field names.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

/// Declaration block for one table.
///
/// # Examples
///
/// ```
/// use table_schema_core::TableDeclaration;
///
/// let decl = TableDeclaration::new()
///     .field("id", "INT NOT NULL")
///     .field("hell", "BLOB")
///     .primary_keys(["id", "hell"]);
/// assert_eq!(decl.field_definitions.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDeclaration {
    /// Field name to grammar string, in declaration order.
    #[serde(alias = "field_definition", alias = "fieldDefinitions")]
    pub field_definitions: OrderedMap<String>,
    /// Optional primary key.
    #[serde(
        default,
        alias = "primaryKeys",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_keys: Option<PrimaryKeys>,
}

impl TableDeclaration {
    /// Creates an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field definition.
    pub fn field(mut self, name: impl Into<String>, declaration: impl Into<String>) -> Self {
        self.field_definitions.insert(name, declaration.into());
        self
    }

    /// Sets a single-field primary key.
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_keys = Some(PrimaryKeys::Single(name.into()));
        self
    }

    /// Sets a (possibly composite) primary key.
    pub fn primary_keys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = Some(PrimaryKeys::Many(names.into_iter().map(Into::into).collect()));
        self
    }
}

/// A full declaration: table name to [`TableDeclaration`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDeclaration {
    /// Tables in declaration order.
    pub tables: OrderedMap<TableDeclaration>,
}

impl SchemaDeclaration {
    /// Creates an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a table block, replacing any block with the same name.
    pub fn table(mut self, name: impl Into<String>, table: TableDeclaration) -> Self {
        self.tables.insert(name, table);
        self
    }
}
