//! Connection lifecycle and schema reconciliation.
//!
//! A [`Connector`] owns one database file, the declared schema model for it
//! and the column layout resolved against the live database. It is a scoped
//! resource: dropping it commits (when configured) and closes the
//! connection.
//!
//! Reconciliation is additive only. Missing tables are created and missing
//! columns are added in declared order; nothing is ever dropped or renamed,
//! so a column removed from the declaration is left behind in the file.
//!
//! # Example
//!
//! ```no_run
//! use table_schema_core::{Database, SchemaDeclaration, TableDeclaration};
//! use table_schema_sqlite::Connector;
//!
//! let decl = SchemaDeclaration::new().table(
//!     "T",
//!     TableDeclaration::new()
//!         .field("id", "INTEGER AUTOINCREMENT")
//!         .field("name", "TEXT NOT NULL"),
//! );
//! let schema = Database::from_declaration(&decl).unwrap();
//!
//! let mut connector = Connector::new("app.db", schema);
//! connector.connect().unwrap();
//! let report = connector.validate_tables().unwrap();
//! println!("created {:?}", report.tables_created);
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use table_schema_core::{Database, SchemaError, Table, validate_database, validate_table};
use table_schema_db::ConnectionConfig;
use tracing::{debug, info, warn};

use crate::error::{Result, SqliteError};
use crate::introspect;
use crate::layout::ColumnLayout;
use crate::schema::{add_column_sql, create_table_sql, validate_table_identifiers};

const IN_MEMORY: &str = ":memory:";

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Tables that did not exist and were created.
    pub tables_created: Vec<String>,
    /// `(table, field)` pairs added to existing tables, in the order added.
    pub columns_added: Vec<(String, String)>,
}

impl ReconcileReport {
    /// Returns `true` if the live database already matched.
    pub fn is_empty(&self) -> bool {
        self.tables_created.is_empty() && self.columns_added.is_empty()
    }
}

/// Owns a database connection together with its schema model.
///
/// Operations attempted before [`connect`](Self::connect) are skipped with a
/// logged warning rather than failing.
pub struct Connector {
    path: PathBuf,
    schema: Database,
    layout: ColumnLayout,
    conn: Option<Connection>,
    commit_on_close: bool,
    create_if_missing: bool,
}

impl Connector {
    /// Creates a connector for `path` with the given schema model.
    ///
    /// The connector takes its own copy of the model; clone a shared model
    /// to use it for several connections.
    pub fn new(path: impl Into<PathBuf>, schema: Database) -> Self {
        Self {
            path: path.into(),
            schema,
            layout: ColumnLayout::new(),
            conn: None,
            commit_on_close: true,
            create_if_missing: true,
        }
    }

    /// Creates a connector from a [`ConnectionConfig`].
    pub fn from_config(config: &ConnectionConfig, schema: Database) -> Self {
        Self::new(&config.path, schema)
            .with_commit_on_close(config.commit_on_close)
            .with_create_if_missing(config.create_if_missing)
    }

    /// Sets whether outstanding changes are committed on release.
    pub fn with_commit_on_close(mut self, commit_on_close: bool) -> Self {
        self.commit_on_close = commit_on_close;
        self
    }

    /// Sets whether [`connect`](Self::connect) may create a missing file.
    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    /// Opens the database file.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::DatabaseMissing`] if the file does not exist
    /// and creation is disabled, or the engine's error if opening fails.
    pub fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            debug!(path = %self.path.display(), "already connected");
            return Ok(());
        }
        let in_memory = self.path.as_os_str() == IN_MEMORY;
        if !in_memory && !self.path.exists() {
            if !self.create_if_missing {
                return Err(SqliteError::DatabaseMissing(self.path.clone()));
            }
            info!(path = %self.path.display(), "creating new database file");
        }
        self.conn = Some(Connection::open(&self.path)?);
        Ok(())
    }

    /// Returns `true` once [`connect`](Self::connect) has succeeded.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The schema model.
    pub fn schema(&self) -> &Database {
        &self.schema
    }

    /// Column positions resolved by the last reconciliation.
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// The open connection, if any.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    /// Returns the connection, or logs that `operation` is skipped.
    pub(crate) fn live(&self, operation: &str) -> Option<&Connection> {
        if self.conn.is_none() {
            warn!(operation, path = %self.path.display(), "connection is not open; skipping");
        }
        self.conn.as_ref()
    }

    /// Replaces the schema model with the structure found in the database.
    ///
    /// Engine bookkeeping tables are skipped. Useful to bootstrap a model
    /// from an existing file.
    pub fn load_structure_from_database(&mut self) -> Result<()> {
        let Some(conn) = self.live("load_structure_from_database") else {
            return Ok(());
        };

        let mut schema = Database::new();
        let mut layout = ColumnLayout::new();
        for name in introspect::table_names(conn)? {
            let columns = introspect::table_columns(conn, &name)?;
            let table = introspect::load_table(conn, &name, &columns)?;
            layout.set_from_columns(&name, &columns);
            schema.insert_table(table)?;
        }
        debug!(tables = schema.len(), "loaded structure from database");

        self.schema = schema;
        self.layout = layout;
        Ok(())
    }

    /// Brings the live database in line with the schema model.
    ///
    /// Every table is checked before any statement runs, so an invalid
    /// declaration (for example two primary key sources) leaves the
    /// database untouched. Then each declared table is created if missing,
    /// or has its missing columns added in declared order. Finally the
    /// column layout is resolved from the live tables.
    ///
    /// # Errors
    ///
    /// Returns a schema error for an invalid table, an identifier error for
    /// unusable names, or the engine's error if a statement fails.
    pub fn validate_tables(&mut self) -> Result<ReconcileReport> {
        let Some(conn) = self.live("validate_tables") else {
            return Ok(ReconcileReport::default());
        };

        if let Some((table, source)) = validate_database(&self.schema).into_iter().next() {
            return Err(SchemaError::Invalid { table, source }.into());
        }
        for table in self.schema.tables() {
            validate_table_identifiers(table)?;
        }

        let live: HashSet<String> = introspect::table_names(conn)?.into_iter().collect();
        let mut report = ReconcileReport::default();
        let mut resolved = Vec::with_capacity(self.schema.len());
        for table in self.schema.tables() {
            let columns = reconcile_table(conn, table, live.contains(&table.name), &mut report)?;
            resolved.push((table.name.clone(), columns));
        }

        for (name, columns) in resolved {
            self.layout.set_from_columns(&name, &columns);
        }
        Ok(report)
    }

    /// Registers and creates a table at runtime.
    ///
    /// If the table already exists in the file, its missing columns are
    /// added instead.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::DuplicateTable`] if the schema model already
    /// declares a table with this name.
    pub fn add_table(&mut self, table: Table) -> Result<ReconcileReport> {
        let Some(conn) = self.live("add_table") else {
            return Ok(ReconcileReport::default());
        };
        if self.schema.contains(&table.name) {
            return Err(SqliteError::DuplicateTable(table.name));
        }
        if let Some(source) = validate_table(&table).into_iter().next() {
            return Err(SchemaError::Invalid {
                table: table.name,
                source,
            }
            .into());
        }
        validate_table_identifiers(&table)?;

        let mut report = ReconcileReport::default();
        let exists = introspect::table_exists(conn, &table.name)?;
        let columns = reconcile_table(conn, &table, exists, &mut report)?;

        self.layout.set_from_columns(&table.name, &columns);
        self.schema.insert_table(table)?;
        Ok(report)
    }

    /// Commits the open transaction, if any.
    pub fn commit(&mut self) -> Result<()> {
        let Some(conn) = self.live("commit") else {
            return Ok(());
        };
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT;")?;
            debug!(path = %self.path.display(), "committed");
        }
        Ok(())
    }

    /// Releases the connection, reporting any error from the final commit
    /// or close.
    ///
    /// Dropping the connector does the same but can only log failures.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if self.commit_on_close && !conn.is_autocommit() {
            conn.execute_batch("COMMIT;")?;
        }
        conn.close().map_err(|(_, err)| err)?;
        if self.commit_on_close {
            info!(path = %self.path.display(), "commit and close succeeded");
        } else {
            info!(path = %self.path.display(), "closed without commit");
        }
        Ok(())
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!(path = %self.path.display(), error = %err, "failed to release connection");
        }
    }
}

/// Opens an implicit transaction so mutating statements are grouped until
/// the next commit.
pub(crate) fn begin_if_needed(conn: &Connection) -> Result<()> {
    if conn.is_autocommit() {
        conn.execute_batch("BEGIN DEFERRED;")?;
    }
    Ok(())
}

/// Creates `table`, or adds its missing columns when it already exists, and
/// returns the resulting live columns.
fn reconcile_table(
    conn: &Connection,
    table: &Table,
    exists: bool,
    report: &mut ReconcileReport,
) -> Result<Vec<introspect::ColumnInfo>> {
    if !exists {
        let sql = create_table_sql(table)?;
        debug!(table = %table.name, %sql, "creating table");
        conn.execute_batch(&sql)?;
        info!(table = %table.name, "created table");
        report.tables_created.push(table.name.clone());
        return introspect::table_columns(conn, &table.name);
    }

    let columns = introspect::table_columns(conn, &table.name)?;
    let existing: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let missing: Vec<_> = table
        .fields
        .iter()
        .filter(|f| !existing.contains(f.name.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(columns);
    }

    for field in missing {
        warn!(table = %table.name, field = %field.name, "field not found in live table, adding column");
        conn.execute_batch(&add_column_sql(&table.name, field)?)?;
        report
            .columns_added
            .push((table.name.clone(), field.name.clone()));
    }
    introspect::table_columns(conn, &table.name)
}
