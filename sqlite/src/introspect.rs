//! Live schema introspection.
//!
//! Reads table names from `sqlite_master` and per-table column metadata from
//! `PRAGMA table_info`, and turns them back into schema model tables.

use rusqlite::{Connection, OptionalExtension, params};
use table_schema_core::{Field, FieldType, Table};

use crate::error::Result;
use crate::schema::validate_identifier;

/// One row of `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Position of the column in the live table.
    pub index: usize,
    /// Column name.
    pub name: String,
    /// Declared type as stored by the engine (may be empty).
    pub declared_type: String,
    /// `NOT NULL` constraint.
    pub not_null: bool,
    /// Default value expression.
    pub default: Option<String>,
    /// 1-based position within the primary key, 0 if not part of it.
    pub primary_key: usize,
}

/// Lists user tables, ordered by name.
///
/// Engine bookkeeping tables (`sqlite_sequence` and anything else with the
/// reserved `sqlite_` prefix) are skipped.
pub fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names
        .into_iter()
        .filter(|n| !n.starts_with("sqlite_"))
        .collect())
}

/// Checks whether a table exists.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1")?;
    let count: i64 = stmt.query_row(params![table], |row| row.get(0))?;
    Ok(count > 0)
}

/// Reads column metadata for a table in live column order.
///
/// Returns an empty list for a table that does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    validate_identifier(table)?;
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                index: row.get::<_, i64>(0)? as usize,
                name: row.get(1)?,
                declared_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? != 0,
                default: row.get(4)?,
                primary_key: row.get::<_, i64>(5)? as usize,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Returns the `CREATE TABLE` text the engine stored for a table.
fn create_statement(conn: &Connection, table: &str) -> Result<Option<String>> {
    let sql = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type='table' AND name=?1",
            params![table],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(sql.flatten())
}

/// Builds a model field from a live column.
///
/// The storage kind follows the engine's type-affinity rules; uniqueness is
/// not visible through `table_info` and is reported as `false`. A declared
/// type the field grammar does not accept (`BIGINT`, `VARCHAR(20)`) is
/// replaced by the kind's canonical name so the field renders back into a
/// loadable declaration.
///
/// # Errors
///
/// Returns a schema error for NUMERIC-affinity columns, which have no
/// matching storage kind.
pub fn field_from_column(column: &ColumnInfo) -> Result<Field> {
    let kind = FieldType::from_affinity(&column.declared_type)?;
    let type_name = match FieldType::parse(column.declared_type.trim()) {
        Ok(_) => column.declared_type.trim().to_string(),
        Err(_) => kind.as_sql().to_string(),
    };
    Ok(Field {
        name: column.name.clone(),
        type_name,
        kind,
        unique: false,
        not_null: column.not_null,
        auto_increment: false,
        default: column.default.clone(),
    })
}

/// Rebuilds a model table from live metadata.
///
/// Primary key columns are collected in key order. A single-column key on a
/// table created with `AUTOINCREMENT` is reported as an auto-increment
/// field instead of an explicit key.
pub fn load_table(conn: &Connection, table: &str, columns: &[ColumnInfo]) -> Result<Table> {
    let mut fields = columns
        .iter()
        .map(field_from_column)
        .collect::<Result<Vec<_>>>()?;

    let mut keyed: Vec<&ColumnInfo> = columns.iter().filter(|c| c.primary_key > 0).collect();
    keyed.sort_by_key(|c| c.primary_key);
    let mut primary_keys: Vec<String> = keyed.iter().map(|c| c.name.clone()).collect();

    let auto_increment = create_statement(conn, table)?
        .is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"));
    if auto_increment && primary_keys.len() == 1 {
        if let Some(field) = fields.iter_mut().find(|f| f.name == primary_keys[0]) {
            field.auto_increment = true;
            primary_keys.clear();
        }
    }

    Ok(Table::new(table, fields, primary_keys)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE BasicTable (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, time REAL DEFAULT 1.5);
             CREATE TABLE test_table (id INT NOT NULL, id2 INT, hell BLOB, PRIMARY KEY (id, hell));
             INSERT INTO BasicTable (name) VALUES ('a');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_table_names_skip_bookkeeping() {
        let conn = conn();
        // sqlite_sequence exists once an AUTOINCREMENT table received a row.
        assert!(table_exists(&conn, "sqlite_sequence").unwrap());
        assert_eq!(table_names(&conn).unwrap(), ["BasicTable", "test_table"]);
    }

    #[test]
    fn test_table_columns() {
        let conn = conn();
        let columns = table_columns(&conn, "BasicTable").unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].primary_key, 1);
        assert_eq!(columns[1].index, 1);
        assert!(columns[1].not_null);
        assert_eq!(columns[2].declared_type, "REAL");
        assert_eq!(columns[2].default.as_deref(), Some("1.5"));
        assert!(table_columns(&conn, "missing").unwrap().is_empty());
    }

    #[test]
    fn test_load_table_auto_increment() {
        let conn = conn();
        let columns = table_columns(&conn, "BasicTable").unwrap();
        let table = load_table(&conn, "BasicTable", &columns).unwrap();
        assert!(table.primary_keys.is_empty());
        assert!(table.field("id").unwrap().auto_increment);
        assert_eq!(table.field("time").unwrap().kind, FieldType::Real);
    }

    #[test]
    fn test_load_table_composite_key() {
        let conn = conn();
        let columns = table_columns(&conn, "test_table").unwrap();
        let table = load_table(&conn, "test_table", &columns).unwrap();
        assert_eq!(table.primary_keys, ["id", "hell"]);
        assert_eq!(table.field("id").unwrap().type_name, "INT");
        assert!(table.fields.iter().all(|f| !f.auto_increment));
    }

    #[test]
    fn test_foreign_type_names_are_canonicalized() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE T (id BIGINT, name VARCHAR(20) NOT NULL, raw);")
            .unwrap();
        let columns = table_columns(&conn, "T").unwrap();
        let table = load_table(&conn, "T", &columns).unwrap();

        let id = table.field("id").unwrap();
        assert_eq!((id.type_name.as_str(), id.kind), ("INTEGER", FieldType::Integer));
        let name = table.field("name").unwrap();
        assert_eq!((name.type_name.as_str(), name.kind), ("TEXT", FieldType::Text));
        assert_eq!(name.declaration(), "TEXT NOT NULL");
        assert_eq!(table.field("raw").unwrap().type_name, "BLOB");
    }
}
