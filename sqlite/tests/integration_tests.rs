//! Integration tests for the table-schema-sqlite crate.

use std::path::Path;

use rusqlite::Connection;
use table_schema_core::{
    Database, Field, FieldType, Record, SchemaDeclaration, SchemaError, Table, TableDeclaration,
    ValidationError, Value,
};
use table_schema_db::{AutoCommitConfig, ConnectionConfig};
use table_schema_sqlite::{Connector, Fields, Operator, SqliteError, table_columns, table_names};
use tempfile::TempDir;

/// Table with an auto-increment key, a unique name and a defaulted score.
fn basic_schema() -> Database {
    Database::from_declaration(&SchemaDeclaration::new().table(
        "BasicTable",
        TableDeclaration::new()
            .field("id", "INTEGER AUTOINCREMENT")
            .field("name", "TEXT UNIQUE NOT NULL")
            .field("score", "REAL DEFAULT 0"),
    ))
    .unwrap()
}

fn reconciled(path: impl AsRef<Path>, schema: Database) -> Connector {
    let mut connector = Connector::new(path.as_ref(), schema);
    connector.connect().unwrap();
    connector.validate_tables().unwrap();
    connector
}

fn row_count(path: &Path, table: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    table_columns(conn, table)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn test_validate_creates_tables_in_empty_database() {
    let mut connector = Connector::new(":memory:", basic_schema());
    connector.connect().unwrap();

    let report = connector.validate_tables().unwrap();
    assert_eq!(report.tables_created, ["BasicTable"]);
    assert!(report.columns_added.is_empty());

    let conn = connector.connection().unwrap();
    assert_eq!(column_names(conn, "BasicTable"), ["id", "name", "score"]);
    let layout = connector.layout();
    assert_eq!(layout.index_of("BasicTable", "id"), Some(0));
    assert_eq!(layout.index_of("BasicTable", "name"), Some(1));
    assert_eq!(layout.index_of("BasicTable", "score"), Some(2));

    // A second pass finds nothing to do.
    assert!(connector.validate_tables().unwrap().is_empty());
}

#[test]
fn test_validate_adds_missing_columns_and_keeps_live_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE T (b INTEGER, a TEXT); INSERT INTO T VALUES (1, 'x');")
            .unwrap();
    }

    let schema = Database::from_declaration(&SchemaDeclaration::new().table(
        "T",
        TableDeclaration::new()
            .field("a", "TEXT")
            .field("b", "INTEGER")
            .field("c", "REAL DEFAULT 1.5"),
    ))
    .unwrap();
    let mut connector = Connector::new(&path, schema);
    connector.connect().unwrap();

    let report = connector.validate_tables().unwrap();
    assert!(report.tables_created.is_empty());
    assert_eq!(report.columns_added, [("T".to_string(), "c".to_string())]);

    let conn = connector.connection().unwrap();
    assert_eq!(column_names(conn, "T"), ["b", "a", "c"]);
    assert_eq!(connector.layout().index_of("T", "c"), Some(2));

    let op = Operator::new(&mut connector);
    let rows = op.select("*", "T", None).unwrap();
    assert_eq!(rows.len(), 1);
    let keys: Vec<_> = rows[0].keys().collect();
    assert_eq!(keys, ["b", "a", "c"]);
    assert_eq!(rows[0].get("c"), Some(&Value::Real(1.5)));
}

#[test]
fn test_validate_adds_several_missing_columns_in_declared_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("several.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE T (a TEXT);").unwrap();
    }

    let schema = Database::from_declaration(&SchemaDeclaration::new().table(
        "T",
        TableDeclaration::new()
            .field("z", "INTEGER")
            .field("a", "TEXT")
            .field("m", "REAL DEFAULT 0"),
    ))
    .unwrap();
    let mut connector = Connector::new(&path, schema);
    connector.connect().unwrap();

    let report = connector.validate_tables().unwrap();
    assert_eq!(
        report.columns_added,
        [
            ("T".to_string(), "z".to_string()),
            ("T".to_string(), "m".to_string()),
        ]
    );
    let conn = connector.connection().unwrap();
    assert_eq!(column_names(conn, "T"), ["a", "z", "m"]);
    assert_eq!(connector.layout().index_of("T", "z"), Some(1));
    assert_eq!(connector.layout().index_of("T", "m"), Some(2));
}

#[test]
fn test_int_auto_increment_creates_rowid_key() {
    let schema = Database::from_declaration(&SchemaDeclaration::new().table(
        "T",
        TableDeclaration::new()
            .field("id", "INT AUTOINCREMENT")
            .field("name", "TEXT"),
    ))
    .unwrap();
    let mut connector = reconciled(":memory:", schema);
    let mut op = Operator::new(&mut connector);
    op.insert("T", &Record::new().with("name", "a"), None).unwrap();
    op.insert("T", &Record::new().with("name", "b"), None).unwrap();
    assert_eq!(op.last_insert_rowid(), Some(2));
}

#[test]
fn test_loaded_structure_with_foreign_types_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foreign.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE T (id BIGINT, name VARCHAR(20) NOT NULL);")
            .unwrap();
    }

    let mut connector = Connector::new(&path, Database::new());
    connector.connect().unwrap();
    connector.load_structure_from_database().unwrap();

    let declaration = connector.schema().to_declaration();
    let rebuilt = Database::from_declaration(&declaration).unwrap();
    let table = rebuilt.table("T").unwrap();
    assert_eq!(table.field("id").unwrap().kind, FieldType::Integer);
    assert_eq!(table.field("name").unwrap().kind, FieldType::Text);
    assert!(table.field("name").unwrap().not_null);
    assert_eq!(&rebuilt, connector.schema());
}

#[test]
fn test_leftover_live_columns_are_ignored_by_wildcard_select() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leftover.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE T (old TEXT, name TEXT); INSERT INTO T VALUES ('o', 'n');")
            .unwrap();
    }
    let schema = Database::from_declaration(
        &SchemaDeclaration::new().table("T", TableDeclaration::new().field("name", "TEXT")),
    )
    .unwrap();
    let mut connector = reconciled(&path, schema);

    let op = Operator::new(&mut connector);
    let rows = op.select("*", "T", None).unwrap();
    assert_eq!(rows, [Record::new().with("name", "n")]);
}

#[test]
fn test_two_primary_key_sources_fail_before_any_ddl() {
    let declaration = SchemaDeclaration::new().table(
        "T",
        TableDeclaration::new()
            .field("id", "INTEGER AUTOINCREMENT")
            .field("name", "TEXT")
            .primary_key("name"),
    );
    assert!(matches!(
        Database::from_declaration(&declaration),
        Err(SchemaError::Invalid {
            source: ValidationError::MultiplePrimaryKeys,
            ..
        })
    ));

    // A model assembled by hand is still checked before reconciliation.
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.db");
    let mut schema = Database::new();
    schema
        .insert_table(Table {
            name: "Good".into(),
            fields: vec![Field::new("a", FieldType::Text)],
            primary_keys: Vec::new(),
        })
        .unwrap();
    schema
        .insert_table(Table {
            name: "T".into(),
            fields: vec![
                Field::parse("id", "INTEGER AUTOINCREMENT").unwrap(),
                Field::new("name", FieldType::Text),
            ],
            primary_keys: vec!["name".into()],
        })
        .unwrap();

    let mut connector = Connector::new(&path, schema);
    connector.connect().unwrap();
    assert!(matches!(
        connector.validate_tables(),
        Err(SqliteError::SchemaError(SchemaError::Invalid { table, .. })) if table == "T"
    ));
    assert!(table_names(connector.connection().unwrap()).unwrap().is_empty());
}

#[test]
fn test_composite_primary_key() {
    let schema = Database::from_declaration(&SchemaDeclaration::new().table(
        "Pairs",
        TableDeclaration::new()
            .field("id", "INTEGER")
            .field("hell", "TEXT")
            .field("note", "TEXT")
            .primary_keys(["id", "hell"]),
    ))
    .unwrap();
    let mut connector = reconciled(":memory:", schema);

    let sql: String = connector
        .connection()
        .unwrap()
        .query_row(
            "SELECT sql FROM sqlite_master WHERE name = 'Pairs'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(sql.contains("PRIMARY KEY (id,hell)"), "{sql}");

    let mut op = Operator::new(&mut connector);
    let row = Record::new().with("id", 1).with("hell", "a");
    op.insert("Pairs", &row, None).unwrap();
    op.insert("Pairs", &Record::new().with("id", 1).with("hell", "b"), None)
        .unwrap();
    assert!(matches!(
        op.insert("Pairs", &row, None),
        Err(SqliteError::DatabaseError(_))
    ));
    op.insert("Pairs", &row.clone().with("note", "replaced"), Some("OR REPLACE"))
        .unwrap();

    let rows = op.select(["note"], "Pairs", Some("hell = 'a'")).unwrap();
    assert_eq!(rows, [Record::new().with("note", "replaced")]);
    assert_eq!(op.raw_select("COUNT(*)", "Pairs", None).unwrap(), [[Value::Integer(2)]]);
}

#[test]
fn test_add_table_at_runtime() {
    let mut connector = reconciled(":memory:", basic_schema());

    let err = connector
        .add_table(Table::new("BasicTable", vec![Field::new("x", FieldType::Text)], vec![]).unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "trying to add an existing table: BasicTable");

    let table = Table::from_declaration(
        "Extra",
        &TableDeclaration::new()
            .field("key", "TEXT")
            .field("data", "BLOB")
            .primary_key("key"),
    )
    .unwrap();
    let report = connector.add_table(table).unwrap();
    assert_eq!(report.tables_created, ["Extra"]);
    assert!(connector.schema().contains("Extra"));
    assert_eq!(connector.layout().index_of("Extra", "data"), Some(1));

    let mut op = Operator::new(&mut connector);
    op.insert(
        "Extra",
        &Record::new().with("key", "k").with("data", vec![1u8, 2, 3]),
        None,
    )
    .unwrap();
    let rows = op.select("*", "Extra", None).unwrap();
    assert_eq!(rows[0].get("data"), Some(&Value::Blob(vec![1, 2, 3])));
}

#[test]
fn test_load_structure_from_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("structure.db");
    {
        let mut connector = reconciled(&path, basic_schema());
        let pairs = Table::from_declaration(
            "Pairs",
            &TableDeclaration::new()
                .field("a", "INT NOT NULL")
                .field("b", "TEXT DEFAULT 'x'")
                .primary_keys(["b", "a"]),
        )
        .unwrap();
        connector.add_table(pairs).unwrap();
        connector.close().unwrap();
    }

    let mut connector = Connector::new(&path, Database::new());
    connector.connect().unwrap();
    connector.load_structure_from_database().unwrap();

    let schema = connector.schema();
    assert_eq!(schema.table_names().collect::<Vec<_>>(), ["BasicTable", "Pairs"]);

    let basic = schema.table("BasicTable").unwrap();
    assert_eq!(basic.auto_increment_field().map(|f| f.name.as_str()), Some("id"));
    assert!(basic.primary_keys.is_empty());
    let name = basic.field("name").unwrap();
    assert_eq!(name.kind, FieldType::Text);
    assert!(name.not_null);
    assert_eq!(basic.field("score").unwrap().default.as_deref(), Some("0"));

    let pairs = schema.table("Pairs").unwrap();
    assert_eq!(pairs.primary_keys, ["b", "a"]);
    assert_eq!(pairs.field("a").unwrap().kind, FieldType::Integer);
    assert_eq!(pairs.field("b").unwrap().default.as_deref(), Some("'x'"));
    assert_eq!(connector.layout().index_of("Pairs", "b"), Some(1));

    // The loaded model reconciles cleanly against the same file.
    assert!(connector.validate_tables().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[test]
fn test_last_insert_rowid_sequence() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::new(&mut connector);
    assert_eq!(op.last_insert_rowid(), None);

    op.insert("BasicTable", &Record::new().with("name", "a"), None)
        .unwrap();
    assert_eq!(op.last_insert_rowid(), Some(1));
    op.insert("BasicTable", &Record::new().with("name", "b"), None)
        .unwrap();
    assert_eq!(op.last_insert_rowid(), Some(2));
}

#[test]
fn test_round_trip_all_kinds() {
    let schema = Database::from_declaration(&SchemaDeclaration::new().table(
        "Kinds",
        TableDeclaration::new()
            .field("i", "INTEGER")
            .field("r", "REAL")
            .field("t", "TEXT")
            .field("b", "BLOB")
            .field("n", "TEXT"),
    ))
    .unwrap();
    let mut connector = reconciled(":memory:", schema);
    let mut op = Operator::new(&mut connector);

    let record = Record::new()
        .with("i", -42)
        .with("r", 2.5)
        .with("t", "héllo")
        .with("b", vec![0u8, 255])
        .with("n", Value::Null);
    op.insert("Kinds", &record, None).unwrap();

    let rows = op.select("*", "Kinds", None).unwrap();
    assert_eq!(rows, [record]);
}

#[test]
fn test_unique_violation_is_reported_unchanged() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::new(&mut connector);
    let row = Record::new().with("name", "dup");
    op.insert("BasicTable", &row, None).unwrap();

    let err = op.insert("BasicTable", &row, None).unwrap_err();
    match err {
        SqliteError::DatabaseError(e) => assert!(e.to_string().contains("UNIQUE"), "{e}"),
        other => panic!("unexpected error: {other}"),
    }

    op.insert("BasicTable", &row, Some("OR IGNORE")).unwrap();
    assert_eq!(op.select("*", "BasicTable", None).unwrap().len(), 1);
}

#[test]
fn test_insert_rejects_unknown_names_and_mismatched_kinds() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::new(&mut connector);

    assert!(matches!(
        op.insert("Nope", &Record::new().with("name", "a"), None),
        Err(SqliteError::UnknownTable(t)) if t == "Nope"
    ));
    assert!(matches!(
        op.insert("BasicTable", &Record::new().with("nmae", "a"), None),
        Err(SqliteError::UnknownField { field, .. }) if field == "nmae"
    ));
    assert!(matches!(
        op.insert("BasicTable", &Record::new().with("name", 5), None),
        Err(SqliteError::ConversionError(_))
    ));
    assert!(matches!(
        op.select(["id", "ghost"], "BasicTable", None),
        Err(SqliteError::UnknownField { .. })
    ));
    assert_eq!(op.pending_changes(), 0);
}

#[test]
fn test_update_and_delete() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::new(&mut connector);
    for name in ["a", "b", "c"] {
        op.insert("BasicTable", &Record::new().with("name", name), None)
            .unwrap();
    }

    let changed = op
        .update("BasicTable", &Record::new().with("score", 9), Some("id >= 2"))
        .unwrap();
    assert_eq!(changed, 2);
    assert!(matches!(
        op.update("BasicTable", &Record::new(), None),
        Err(SqliteError::EmptyRecord(_))
    ));

    let rows = op
        .select(Fields::from(["name", "score"]), "BasicTable", Some("score > 1"))
        .unwrap();
    assert_eq!(
        rows,
        [
            Record::new().with("name", "b").with("score", 9.0),
            Record::new().with("name", "c").with("score", 9.0),
        ]
    );

    assert_eq!(op.delete("BasicTable", Some("name = 'a'")).unwrap(), 1);
    assert_eq!(op.delete("BasicTable", None).unwrap(), 2);
    assert!(op.select("*", "BasicTable", None).unwrap().is_empty());
}

#[test]
fn test_select_advanced_uses_engine_column_names() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::new(&mut connector);
    for (name, score) in [("a", 1.0), ("b", 3.0), ("c", 3.0)] {
        op.insert(
            "BasicTable",
            &Record::new().with("name", name).with("score", score),
            None,
        )
        .unwrap();
    }

    let rows = op
        .select_advanced(
            "score, COUNT(*) AS n",
            "BasicTable",
            Some("GROUP BY score ORDER BY score DESC"),
        )
        .unwrap();
    assert_eq!(
        rows,
        [
            Record::new().with("score", 3.0).with("n", 2),
            Record::new().with("score", 1.0).with("n", 1),
        ]
    );

    let raw = op
        .raw_select("name, score", "BasicTable", Some("id = 2"))
        .unwrap();
    assert_eq!(raw, [vec![Value::from("b"), Value::Real(3.0)]]);
}

#[test]
fn test_execute_runs_statement_text() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::new(&mut connector);
    op.execute("INSERT INTO BasicTable (name) VALUES ('raw'); INSERT INTO BasicTable (name) VALUES ('raw2');")
        .unwrap();
    assert_eq!(op.select("*", "BasicTable", None).unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[test]
fn test_auto_commit_after_interval() {
    let mut connector = reconciled(":memory:", basic_schema());
    let mut op = Operator::with_auto_commit(
        &mut connector,
        AutoCommitConfig {
            enabled: true,
            interval: 2,
        },
    );

    for name in ["a", "b"] {
        op.insert("BasicTable", &Record::new().with("name", name), None)
            .unwrap();
    }
    assert_eq!(op.pending_changes(), 2);
    assert!(!op.connector().connection().unwrap().is_autocommit());

    op.insert("BasicTable", &Record::new().with("name", "c"), None)
        .unwrap();
    assert_eq!(op.pending_changes(), 0);
    assert!(op.connector().connection().unwrap().is_autocommit());

    op.set_auto_commit(false);
    for name in ["d", "e", "f", "g"] {
        op.insert("BasicTable", &Record::new().with("name", name), None)
            .unwrap();
    }
    assert_eq!(op.pending_changes(), 4);
    op.commit().unwrap();
    assert_eq!(op.pending_changes(), 0);
}

#[test]
fn test_commit_on_close_persists_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("persist.db");
    {
        let mut connector = reconciled(&path, basic_schema());
        let mut op = Operator::new(&mut connector);
        op.insert("BasicTable", &Record::new().with("name", "kept"), None)
            .unwrap();
    }
    assert_eq!(row_count(&path, "BasicTable"), 1);

    {
        let mut connector = reconciled(&path, basic_schema()).with_commit_on_close(false);
        let mut op = Operator::new(&mut connector);
        op.insert("BasicTable", &Record::new().with("name", "lost"), None)
            .unwrap();
    }
    assert_eq!(row_count(&path, "BasicTable"), 1);
}

#[test]
fn test_from_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("configured.db");
    let mut config = ConnectionConfig::new(&path);
    config.create_if_missing = false;

    let mut connector = Connector::from_config(&config, basic_schema());
    assert!(matches!(
        connector.connect(),
        Err(SqliteError::DatabaseMissing(_))
    ));

    config.create_if_missing = true;
    let mut connector = Connector::from_config(&config, basic_schema());
    connector.connect().unwrap();
    connector.validate_tables().unwrap();
    connector.close().unwrap();
    assert!(path.exists());
}

#[test]
fn test_operations_without_connection_are_noops() {
    let mut connector = Connector::new(":memory:", basic_schema());
    assert!(connector.add_table(Table::new("X", vec![Field::new("a", FieldType::Text)], vec![]).unwrap())
        .unwrap()
        .is_empty());

    let mut op = Operator::new(&mut connector);
    op.insert("BasicTable", &Record::new().with("name", "a"), None)
        .unwrap();
    assert_eq!(op.update("BasicTable", &Record::new().with("name", "b"), None).unwrap(), 0);
    assert_eq!(op.delete("BasicTable", None).unwrap(), 0);
    assert!(op.select("*", "BasicTable", None).unwrap().is_empty());
    assert!(op.select_advanced("*", "BasicTable", None).unwrap().is_empty());
    assert!(op.raw_select("*", "BasicTable", None).unwrap().is_empty());
    assert_eq!(op.last_insert_rowid(), None);
    op.execute("DROP TABLE BasicTable").unwrap();
    op.commit().unwrap();
    assert_eq!(op.pending_changes(), 0);
    assert!(!op.connector().schema().contains("X"));
}
