//! Compact field declaration grammar.
//!
//! A field is declared with a single string such as
//! `"INTEGER NOT NULL AUTOINCREMENT DEFAULT 3"`: a base type token followed,
//! in any order, by the modifiers `UNIQUE`, `NOT NULL`, `AUTOINCREMENT` and
//! `DEFAULT <value>`. Matching is case-insensitive.
//!
//! # Known limitation
//!
//! Modifiers are matched as raw substrings, not whole words. A default value
//! or type name containing one of the reserved words (for example
//! `DEFAULT UNIQUE_ID`) is mis-parsed. No escaping rules exist.
//!
//! # Examples
//!
//! ```
//! use table_schema_core::{FieldType, parse_field};
//!
//! let field = parse_field("count", "integer not null default 3").unwrap();
//! assert_eq!(field.kind, FieldType::Integer);
//! assert!(field.not_null);
//! assert_eq!(field.default.as_deref(), Some("3"));
//! ```

use crate::error::{Result, SchemaError};
use crate::model::Field;
use crate::types::FieldType;

/// `UNIQUE` modifier.
pub const UNIQUE_TOKEN: &str = "UNIQUE";
/// `NOT NULL` modifier.
pub const NOT_NULL_TOKEN: &str = "NOT NULL";
/// `AUTOINCREMENT` modifier.
pub const AUTO_INCREMENT_TOKEN: &str = "AUTOINCREMENT";
/// `DEFAULT <value>` modifier.
pub const DEFAULT_TOKEN: &str = "DEFAULT";

/// Working copy of a declaration: the original text and an ASCII-uppercased
/// twin with identical byte offsets.
struct Declaration {
    text: String,
    upper: String,
}

impl Declaration {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            upper: text.to_ascii_uppercase(),
        }
    }

    /// Removes the first occurrence of `token`, returning where it started.
    fn take(&mut self, token: &str) -> Option<usize> {
        let start = self.upper.find(token)?;
        self.cut(start, start + token.len());
        Some(start)
    }

    fn cut(&mut self, start: usize, end: usize) {
        self.text.replace_range(start..end, " ");
        self.upper.replace_range(start..end, " ");
    }

    /// Removes `DEFAULT` and the whitespace-delimited value after it.
    ///
    /// Returns `Ok(None)` when there is no `DEFAULT`, and `Err(())` when the
    /// token is present but no value follows.
    fn take_default(&mut self) -> std::result::Result<Option<String>, ()> {
        let Some(start) = self.upper.find(DEFAULT_TOKEN) else {
            return Ok(None);
        };
        let after = start + DEFAULT_TOKEN.len();
        let rest = &self.text[after..];
        let value_start = after + (rest.len() - rest.trim_start().len());
        let value_len = self.text[value_start..]
            .find(char::is_whitespace)
            .unwrap_or(self.text.len() - value_start);
        if value_len == 0 {
            return Err(());
        }
        let value = self.text[value_start..value_start + value_len].to_string();
        self.cut(start, value_start + value_len);
        Ok(Some(value))
    }
}

/// Parses a field declaration string into a [`Field`].
///
/// Modifiers are removed from the string in the order `UNIQUE`, `NOT NULL`,
/// `AUTOINCREMENT`, `DEFAULT <value>`; the first remaining token is the base
/// type. Because each modifier is removed wherever it appears, the position
/// of modifiers in the string does not affect the result.
///
/// # Errors
///
/// - [`SchemaError::MissingDefault`] if `DEFAULT` has no value.
/// - [`SchemaError::InvalidFieldType`] if no token remains for the type.
/// - [`SchemaError::UnsupportedType`] if the type is not `INT`, `INTEGER`,
///   `TEXT`, `REAL` or `BLOB`.
pub fn parse_field(name: &str, declaration: &str) -> Result<Field> {
    let mut decl = Declaration::new(declaration);

    let unique = decl.take(UNIQUE_TOKEN).is_some();
    let not_null = decl.take(NOT_NULL_TOKEN).is_some();
    let auto_increment = decl.take(AUTO_INCREMENT_TOKEN).is_some();
    let default = decl.take_default().map_err(|()| SchemaError::MissingDefault {
        field: name.to_string(),
    })?;

    let type_name = decl
        .text
        .split_whitespace()
        .next()
        .ok_or_else(|| SchemaError::InvalidFieldType {
            field: name.to_string(),
            declaration: declaration.to_string(),
        })?
        .to_string();
    let kind = FieldType::parse(&type_name)?;

    Ok(Field {
        name: name.to_string(),
        type_name,
        kind,
        unique,
        not_null,
        auto_increment,
        default,
    })
}
