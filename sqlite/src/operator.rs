//! CRUD operations over a reconciled connector.
//!
//! [`Operator`] renders statements from the schema model, converts record
//! values through each field's storage conversion and executes them on the
//! connector's connection. Mutations run inside an implicit transaction
//! that ends on [`commit`](Operator::commit), on an automatic commit, or
//! when the connector is released.
//!
//! # Example
//!
//! ```no_run
//! use table_schema_core::{Database, Record, SchemaDeclaration, TableDeclaration};
//! use table_schema_sqlite::{Connector, Operator};
//!
//! let decl = SchemaDeclaration::new().table(
//!     "BasicTable",
//!     TableDeclaration::new()
//!         .field("id", "INTEGER AUTOINCREMENT")
//!         .field("name", "TEXT UNIQUE NOT NULL"),
//! );
//! let mut connector = Connector::new("app.db", Database::from_declaration(&decl).unwrap());
//! connector.connect().unwrap();
//! connector.validate_tables().unwrap();
//!
//! let mut op = Operator::new(&mut connector);
//! op.insert("BasicTable", &Record::new().with("name", "ssc"), None).unwrap();
//! op.update("BasicTable", &Record::new().with("name", "aka"), Some("id == 1")).unwrap();
//! for row in op.select("*", "BasicTable", None).unwrap() {
//!     println!("{row:?}");
//! }
//! op.commit().unwrap();
//! ```

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use table_schema_core::{Field, Record, Table, Value};
use table_schema_db::AutoCommitConfig;
use tracing::debug;

use crate::connector::{Connector, begin_if_needed};
use crate::convert::{from_storage, to_storage};
use crate::error::{Result, SqliteError};
use crate::statement::{self, Fields};

/// Statement builder and executor bound to one [`Connector`].
pub struct Operator<'a> {
    connector: &'a mut Connector,
    auto_commit: AutoCommitConfig,
    pending: u32,
}

impl<'a> Operator<'a> {
    /// Creates an operator with automatic commits disabled.
    pub fn new(connector: &'a mut Connector) -> Self {
        Self::with_auto_commit(connector, AutoCommitConfig::default())
    }

    /// Creates an operator with the given automatic commit settings.
    pub fn with_auto_commit(connector: &'a mut Connector, auto_commit: AutoCommitConfig) -> Self {
        Self {
            connector,
            auto_commit,
            pending: 0,
        }
    }

    /// Enables or disables automatic commits.
    pub fn set_auto_commit(&mut self, enabled: bool) {
        self.auto_commit.enabled = enabled;
    }

    /// Sets how many mutating statements may run between automatic commits.
    pub fn set_auto_commit_interval(&mut self, interval: u32) {
        self.auto_commit.interval = interval;
    }

    /// Mutating statements run since the last commit.
    pub fn pending_changes(&self) -> u32 {
        self.pending
    }

    /// The underlying connector.
    pub fn connector(&self) -> &Connector {
        self.connector
    }

    /// Commits outstanding changes and resets the auto-commit counter.
    pub fn commit(&mut self) -> Result<()> {
        self.connector.commit()?;
        self.pending = 0;
        Ok(())
    }

    fn after_mutation(&mut self) -> Result<()> {
        self.pending += 1;
        if self.auto_commit.enabled && self.pending > self.auto_commit.interval {
            debug!(
                path = %self.connector.path().display(),
                pending = self.pending,
                "auto commit"
            );
            self.commit()?;
        }
        Ok(())
    }

    /// Inserts a record.
    ///
    /// `conflict` is a trusted fragment placed between `INSERT` and `INTO`,
    /// such as `"OR REPLACE"` or `"OR IGNORE"`; it is not escaped.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::UnknownTable`] / [`SqliteError::UnknownField`]
    /// for names not in the schema model, a conversion error for values of
    /// the wrong kind, or the engine's error (for example a uniqueness
    /// violation) unchanged.
    pub fn insert(&mut self, table: &str, record: &Record, conflict: Option<&str>) -> Result<()> {
        let Some(conn) = self.connector.live("insert") else {
            return Ok(());
        };
        let table = lookup_table(self.connector, table)?;
        let (columns, values) = bind_record(table, record)?;
        let sql = statement::insert_sql(&table.name, &columns, conflict);
        execute(conn, &sql, values)?;
        self.after_mutation()
    }

    /// Updates rows matching `condition` (all rows when `None`).
    ///
    /// `condition` is a trusted fragment inserted verbatim after `WHERE`.
    /// Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::EmptyRecord`] if the record has no fields, and
    /// otherwise the same errors as [`insert`](Self::insert).
    pub fn update(&mut self, table: &str, record: &Record, condition: Option<&str>) -> Result<usize> {
        let Some(conn) = self.connector.live("update") else {
            return Ok(0);
        };
        let table = lookup_table(self.connector, table)?;
        if record.is_empty() {
            return Err(SqliteError::EmptyRecord(table.name.clone()));
        }
        let (columns, values) = bind_record(table, record)?;
        let sql = statement::update_sql(&table.name, &columns, condition);
        let changed = execute(conn, &sql, values)?;
        self.after_mutation()?;
        Ok(changed)
    }

    /// Deletes rows matching `condition` (all rows when `None`).
    ///
    /// `condition` is a trusted fragment inserted verbatim after `WHERE`.
    /// Returns the number of rows deleted.
    pub fn delete(&mut self, table: &str, condition: Option<&str>) -> Result<usize> {
        let Some(conn) = self.connector.live("delete") else {
            return Ok(0);
        };
        let table = lookup_table(self.connector, table)?;
        let sql = statement::delete_sql(&table.name, condition);
        let deleted = execute(conn, &sql, Vec::new())?;
        self.after_mutation()?;
        Ok(deleted)
    }

    /// Selects rows as records keyed by field name.
    ///
    /// [`Fields::All`] (`"*"`) returns every declared field ordered by its
    /// live column position; a named list returns those fields in the given
    /// order. `condition` is a trusted fragment.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::UnknownField`] for a name not declared on the
    /// table, or [`SqliteError::UnresolvedColumn`] for a wildcard select on
    /// a table that has not been reconciled.
    pub fn select(
        &self,
        fields: impl Into<Fields>,
        table: &str,
        condition: Option<&str>,
    ) -> Result<Vec<Record>> {
        let Some(conn) = self.connector.live("select") else {
            return Ok(Vec::new());
        };
        let table = lookup_table(self.connector, table)?;
        let selected: Vec<&Field> = match fields.into() {
            Fields::All => self.connector.layout().ordered_fields(table)?,
            Fields::Named(names) => names
                .iter()
                .map(|name| lookup_field(table, name))
                .collect::<Result<_>>()?,
        };
        let columns: Vec<&str> = selected.iter().map(|f| f.name.as_str()).collect();
        let sql = statement::select_sql(&table.name, &columns, condition);
        debug!(%sql, "select");

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, field) in selected.iter().enumerate() {
                record.insert(field.name.as_str(), from_storage(row.get_ref(i)?)?);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Runs an ad hoc select and keys each row by the engine-reported
    /// column names, without consulting the schema model.
    ///
    /// `fields`, `table` and `clause` are trusted fragments; `clause` is
    /// appended after the table name (e.g. `"WHERE n > 1 ORDER BY n"`).
    pub fn select_advanced(
        &self,
        fields: &str,
        table: &str,
        clause: Option<&str>,
    ) -> Result<Vec<Record>> {
        let Some(conn) = self.connector.live("select_advanced") else {
            return Ok(Vec::new());
        };
        let sql = statement::advanced_select_sql(table, fields, clause);
        debug!(%sql, "select advanced");

        let mut stmt = conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, name) in names.iter().enumerate() {
                record.insert(name.as_str(), from_storage(row.get_ref(i)?)?);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Runs a select and returns bare value rows in engine column order.
    ///
    /// `fields` and `condition` are trusted fragments.
    pub fn raw_select(
        &self,
        fields: &str,
        table: &str,
        condition: Option<&str>,
    ) -> Result<Vec<Vec<Value>>> {
        let Some(conn) = self.connector.live("raw_select") else {
            return Ok(Vec::new());
        };
        let sql = statement::select_sql(table, &[fields], condition);
        let mut stmt = conn.prepare(&sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(
                (0..width)
                    .map(|i| from_storage(row.get_ref(i)?))
                    .collect::<Result<Vec<_>>>()?,
            );
        }
        Ok(out)
    }

    /// Row id assigned by the most recent successful insert on this
    /// connection, or `None` if nothing has been inserted.
    pub fn last_insert_rowid(&self) -> Option<i64> {
        let conn = self.connector.live("last_insert_rowid")?;
        match conn.last_insert_rowid() {
            0 => None,
            id => Some(id),
        }
    }

    /// Executes arbitrary statement text verbatim.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        let Some(conn) = self.connector.live("execute") else {
            return Ok(());
        };
        conn.execute_batch(sql)?;
        Ok(())
    }
}

fn lookup_table<'c>(connector: &'c Connector, name: &str) -> Result<&'c Table> {
    connector
        .schema()
        .table(name)
        .ok_or_else(|| SqliteError::UnknownTable(name.to_string()))
}

fn lookup_field<'t>(table: &'t Table, name: &str) -> Result<&'t Field> {
    table.field(name).ok_or_else(|| SqliteError::UnknownField {
        table: table.name.clone(),
        field: name.to_string(),
    })
}

/// Resolves each record key to a field and converts its value.
fn bind_record<'r>(table: &Table, record: &'r Record) -> Result<(Vec<&'r str>, Vec<SqlValue>)> {
    let mut columns = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (name, value) in record.iter() {
        let field = lookup_field(table, name)?;
        columns.push(name);
        values.push(to_storage(field, value)?);
    }
    Ok((columns, values))
}

fn execute(conn: &Connection, sql: &str, values: Vec<SqlValue>) -> Result<usize> {
    debug!(%sql, params = values.len(), "execute");
    begin_if_needed(conn)?;
    Ok(conn.execute(sql, params_from_iter(values))?)
}
