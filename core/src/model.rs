//! In-memory schema model: databases, tables and fields.
//!
//! The model is a plain value built once, before any connection is opened,
//! either from a [`SchemaDeclaration`] or from introspection of a live
//! database. It carries no live column positions; those are resolved by the
//! reconciler into a separate layout so a model can be cloned per connection
//! without aliasing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::declaration::{PrimaryKeys, SchemaDeclaration, TableDeclaration};
use crate::error::{Result, SchemaError};
use crate::grammar::{self, AUTO_INCREMENT_TOKEN, DEFAULT_TOKEN, NOT_NULL_TOKEN, UNIQUE_TOKEN};
use crate::types::FieldType;
use crate::validate::validate_table;

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name, unique within its table.
    pub name: String,
    /// Base type token as written (e.g. `INT` or `INTEGER`).
    pub type_name: String,
    /// Storage kind the type token maps to.
    pub kind: FieldType,
    /// `UNIQUE` constraint.
    pub unique: bool,
    /// `NOT NULL` constraint.
    pub not_null: bool,
    /// `AUTOINCREMENT`; makes the field the table's sole primary key.
    pub auto_increment: bool,
    /// Default value literal, inserted verbatim into DDL.
    pub default: Option<String>,
}

impl Field {
    /// Creates a field of the given kind with no modifiers.
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            type_name: kind.as_sql().to_string(),
            kind,
            unique: false,
            not_null: false,
            auto_increment: false,
            default: None,
        }
    }

    /// Parses a field from the compact declaration grammar.
    ///
    /// See [`parse_field`](crate::parse_field).
    pub fn parse(name: &str, declaration: &str) -> Result<Self> {
        grammar::parse_field(name, declaration)
    }

    /// Renders the column clause used in `CREATE TABLE` and
    /// `ALTER TABLE ... ADD COLUMN`, without the column name.
    ///
    /// An auto-increment field renders as `PRIMARY KEY AUTOINCREMENT`, the
    /// only form the engine accepts. The engine also requires the type to be
    /// spelled `INTEGER`, so an `INT` auto-increment field is widened to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use table_schema_core::Field;
    ///
    /// let field = Field::parse("id", "INTEGER NOT NULL AUTOINCREMENT").unwrap();
    /// assert_eq!(field.create_clause(), "INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT");
    /// ```
    pub fn create_clause(&self) -> String {
        let type_name = if self.auto_increment && self.kind == FieldType::Integer {
            FieldType::Integer.as_sql().to_string()
        } else {
            self.type_name.clone()
        };
        let mut parts = vec![type_name];
        if self.unique {
            parts.push(UNIQUE_TOKEN.to_string());
        }
        if self.not_null {
            parts.push(NOT_NULL_TOKEN.to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("{DEFAULT_TOKEN} {default}"));
        }
        if self.auto_increment {
            parts.push(format!("PRIMARY KEY {AUTO_INCREMENT_TOKEN}"));
        }
        parts.join(" ")
    }

    /// Renders the field back into the declaration grammar.
    ///
    /// The result parses back into an equal field.
    pub fn declaration(&self) -> String {
        let mut parts = vec![self.type_name.clone()];
        if self.unique {
            parts.push(UNIQUE_TOKEN.to_string());
        }
        if self.not_null {
            parts.push(NOT_NULL_TOKEN.to_string());
        }
        if self.auto_increment {
            parts.push(AUTO_INCREMENT_TOKEN.to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("{DEFAULT_TOKEN} {default}"));
        }
        parts.join(" ")
    }
}

/// Where a table's primary key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeySource<'a> {
    /// No primary key; the engine's implicit rowid is used.
    None,
    /// An explicit, possibly composite, key.
    Explicit(&'a [String]),
    /// The single auto-increment field.
    AutoIncrement(&'a Field),
}

/// A table: ordered fields plus an optional primary key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, unique within the database.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Explicit primary key field names; empty means none.
    pub primary_keys: Vec<String>,
}

impl Table {
    /// Builds a table and checks its structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] with the first
    /// [`ValidationError`](crate::ValidationError) found, for example when
    /// both an explicit key and an auto-increment field are declared.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<Field>,
        primary_keys: Vec<String>,
    ) -> Result<Self> {
        let table = Self {
            name: name.into(),
            fields,
            primary_keys,
        };
        if let Some(source) = validate_table(&table).into_iter().next() {
            return Err(SchemaError::Invalid {
                table: table.name,
                source,
            });
        }
        Ok(table)
    }

    /// Builds a table from its declaration block.
    ///
    /// A single-string primary key becomes a one-element set and an empty
    /// list means no primary key.
    pub fn from_declaration(name: &str, declaration: &TableDeclaration) -> Result<Self> {
        let fields = declaration
            .field_definitions
            .iter()
            .map(|(field, decl)| grammar::parse_field(field, decl))
            .collect::<Result<Vec<_>>>()?;
        let primary_keys = declaration
            .primary_keys
            .clone()
            .map(PrimaryKeys::into_vec)
            .unwrap_or_default();
        Self::new(name, fields, primary_keys)
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the auto-increment field, if one is declared.
    pub fn auto_increment_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.auto_increment)
    }

    /// Resolves where this table's primary key comes from.
    pub fn primary_key_source(&self) -> PrimaryKeySource<'_> {
        if !self.primary_keys.is_empty() {
            PrimaryKeySource::Explicit(&self.primary_keys)
        } else if let Some(field) = self.auto_increment_field() {
            PrimaryKeySource::AutoIncrement(field)
        } else {
            PrimaryKeySource::None
        }
    }

    /// Renders the table back into a declaration block.
    pub fn to_declaration(&self) -> TableDeclaration {
        let mut decl = TableDeclaration::new();
        for field in &self.fields {
            decl = decl.field(&field.name, field.declaration());
        }
        match self.primary_keys.as_slice() {
            [] => decl,
            [single] => decl.primary_key(single.clone()),
            many => decl.primary_keys(many.to_vec()),
        }
    }
}

/// An ordered collection of uniquely named tables.
///
/// # Examples
///
/// ```
/// use table_schema_core::{Database, SchemaDeclaration, TableDeclaration};
///
/// let decl = SchemaDeclaration::new().table(
///     "T",
///     TableDeclaration::new()
///         .field("id", "INTEGER AUTOINCREMENT")
///         .field("name", "TEXT NOT NULL"),
/// );
/// let db = Database::from_declaration(&decl).unwrap();
/// assert_eq!(db.table("T").unwrap().fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    tables: Vec<Table>,
    by_name: HashMap<String, usize>,
}

impl Database {
    /// Creates an empty database model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every table of a declaration, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed field declaration or invalid table.
    pub fn from_declaration(declaration: &SchemaDeclaration) -> Result<Self> {
        let mut db = Self::new();
        for (name, table) in declaration.tables.iter() {
            db.insert_table(Table::from_declaration(name, table)?)?;
        }
        Ok(db)
    }

    /// Adds a table at the end of the declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] if the name is taken.
    pub fn insert_table(&mut self, table: Table) -> Result<()> {
        if self.by_name.contains_key(&table.name) {
            return Err(SchemaError::DuplicateTable(table.name));
        }
        self.by_name.insert(table.name.clone(), self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).map(|&i| &self.tables[i])
    }

    /// Returns `true` if a table with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Table names in declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no tables are declared.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Renders the model back into a declaration.
    pub fn to_declaration(&self) -> SchemaDeclaration {
        self.tables
            .iter()
            .fold(SchemaDeclaration::new(), |decl, t| {
                decl.table(&t.name, t.to_declaration())
            })
    }
}
