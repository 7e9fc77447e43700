//! DDL generation for declared tables.
//!
//! Renders `CREATE TABLE` and `ALTER TABLE ... ADD COLUMN` statements from
//! the schema model. Names are interpolated unquoted, so every table and
//! field name is checked with [`validate_identifier`] first.

use table_schema_core::{Field, Table};

use crate::error::{Result, SqliteError};

/// Validates that a name contains only alphanumerics and underscores and
/// does not start with a digit.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SqliteError::InvalidIdentifier(name.to_string()))
    }
}

/// Validates the table name and every field name of a table.
pub(crate) fn validate_table_identifiers(table: &Table) -> Result<()> {
    validate_identifier(&table.name)?;
    for field in &table.fields {
        validate_identifier(&field.name)?;
    }
    Ok(())
}

/// Generates the `CREATE TABLE` statement for a table.
///
/// Each field contributes `name <clause>` in declared order; a non-empty
/// primary key set adds a trailing `PRIMARY KEY (a,b)` clause.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidIdentifier`] if a name is not a plain
/// identifier.
pub fn create_table_sql(table: &Table) -> Result<String> {
    validate_table_identifiers(table)?;

    let mut lines: Vec<String> = table
        .fields
        .iter()
        .map(|f| format!("    {} {}", f.name, f.create_clause()))
        .collect();
    if !table.primary_keys.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", table.primary_keys.join(",")));
    }

    Ok(format!(
        "CREATE TABLE {} (\n{}\n);",
        table.name,
        lines.join(",\n")
    ))
}

/// Generates the `ALTER TABLE ... ADD COLUMN` statement for one field.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidIdentifier`] if a name is not a plain
/// identifier.
pub fn add_column_sql(table: &str, field: &Field) -> Result<String> {
    validate_identifier(table)?;
    validate_identifier(&field.name)?;
    Ok(format!(
        "ALTER TABLE {table} ADD COLUMN {} {};",
        field.name,
        field.create_clause()
    ))
}
