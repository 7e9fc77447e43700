//! Resolved live column positions.
//!
//! The schema model never stores where a field sits in the live table.
//! Reconciliation produces a [`ColumnLayout`] instead, mapping each table's
//! column names to their live positions, which the operator uses to line
//! up wildcard selects with the fields they belong to.

use std::collections::HashMap;

use table_schema_core::{Field, Table};

use crate::error::{Result, SqliteError};
use crate::introspect::ColumnInfo;

/// Live column index per table and column name.
///
/// # Examples
///
/// ```
/// use table_schema_sqlite::ColumnLayout;
///
/// let mut layout = ColumnLayout::new();
/// layout.set_table("T", [("id", 0), ("name", 1)]);
/// assert_eq!(layout.index_of("T", "name"), Some(1));
/// assert_eq!(layout.index_of("T", "missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    tables: HashMap<String, HashMap<String, usize>>,
}

impl ColumnLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the recorded positions for one table.
    pub fn set_table<I, S>(&mut self, table: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(|(n, i)| (n.into(), i)).collect();
        self.tables.insert(table.into(), columns);
    }

    /// Records positions from introspected columns.
    pub(crate) fn set_from_columns(&mut self, table: &str, columns: &[ColumnInfo]) {
        self.set_table(table, columns.iter().map(|c| (c.name.as_str(), c.index)));
    }

    /// Live position of a column, if resolved.
    pub fn index_of(&self, table: &str, field: &str) -> Option<usize> {
        self.tables.get(table)?.get(field).copied()
    }

    /// Returns `true` if the table has been resolved.
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Returns the table's fields sorted by live column position.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::UnresolvedColumn`] for the first field with no
    /// recorded position.
    pub fn ordered_fields<'t>(&self, table: &'t Table) -> Result<Vec<&'t Field>> {
        let mut positioned = table
            .fields
            .iter()
            .map(|f| {
                self.index_of(&table.name, &f.name)
                    .map(|i| (i, f))
                    .ok_or_else(|| SqliteError::UnresolvedColumn {
                        table: table.name.clone(),
                        field: f.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        positioned.sort_by_key(|(i, _)| *i);
        Ok(positioned.into_iter().map(|(_, f)| f).collect())
    }
}
