use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use table_schema_core::{Database, Table};
use table_schema_db::{ConnectionConfig, DeclarationLoader, load_database};
use table_schema_sqlite::{Connector, Operator};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for structure dumps.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "table-schema")]
#[command(about = "Declarative SQLite table schemas: check, reconcile and inspect")]
#[command(version)]
struct Cli {
    /// Connection configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse and validate a declaration file or directory.
    Check(CheckArgs),
    /// Create missing tables and columns in a database.
    Reconcile(ReconcileArgs),
    /// Print the structure of an existing database as a declaration.
    Inspect(InspectArgs),
    /// Run an ad hoc select and print rows as JSON.
    Select(SelectArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration file (.json/.yaml) or directory of them.
    decl: PathBuf,
}

#[derive(Debug, Args)]
struct ReconcileArgs {
    /// Database file path.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Declaration file or directory.
    #[arg(long)]
    decl: Option<PathBuf>,
    /// Fail instead of creating a missing database file.
    #[arg(long)]
    no_create: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Database file path.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value = "yaml")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct SelectArgs {
    /// Database file path.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Table name.
    #[arg(long)]
    table: String,
    /// Selected columns or expressions.
    #[arg(long, default_value = "*")]
    fields: String,
    /// Condition placed after WHERE, inserted verbatim.
    #[arg(long = "where")]
    condition: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config;
    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Reconcile(args) => run_reconcile(config, args),
        Command::Inspect(args) => run_inspect(config, args),
        Command::Select(args) => run_select(config, args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Installs a stderr fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Merges `--config` with per-command overrides.
fn resolve_config(
    config: Option<PathBuf>,
    db: Option<PathBuf>,
) -> Result<ConnectionConfig, String> {
    let mut resolved = match config {
        Some(path) => ConnectionConfig::load(&path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => match &db {
            Some(db) => ConnectionConfig::new(db),
            None => return Err("no database given; pass --db or --config".to_string()),
        },
    };
    if let Some(db) = db {
        resolved.path = db;
    }
    debug!(?resolved, "connection config");
    Ok(resolved)
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let declaration = DeclarationLoader::load(&args.decl)
        .map_err(|e| format!("Failed to load '{}': {e}", args.decl.display()))?;

    let mut failures = 0usize;
    let mut database = Database::new();
    for (name, table_decl) in declaration.tables.iter() {
        match Table::from_declaration(name, table_decl) {
            Ok(table) => {
                let fields = table.fields.len();
                if let Err(e) = database.insert_table(table) {
                    failures += 1;
                    println!("FAIL {name}: {e}");
                } else {
                    println!("ok   {name} ({fields} fields)");
                }
            }
            Err(e) => {
                failures += 1;
                println!("FAIL {name}: {e}");
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} table(s) failed validation"));
    }
    println!("{} table(s) valid", database.len());
    Ok(())
}

fn run_reconcile(config: Option<PathBuf>, args: ReconcileArgs) -> Result<(), String> {
    let mut config = resolve_config(config, args.db)?;
    if args.no_create {
        config.create_if_missing = false;
    }
    let decl = args
        .decl
        .or_else(|| config.declaration.clone())
        .ok_or("no declaration given; pass --decl or set `declaration` in the config")?;

    let schema = load_database(&decl)
        .map_err(|e| format!("Failed to load '{}': {e}", decl.display()))?;
    let mut connector = Connector::from_config(&config, schema);
    connector
        .connect()
        .map_err(|e| format!("Failed to open database '{}': {e}", config.path.display()))?;
    let report = connector
        .validate_tables()
        .map_err(|e| format!("Reconcile failed: {e}"))?;
    connector
        .close()
        .map_err(|e| format!("Failed to close database: {e}"))?;

    if report.is_empty() {
        println!("Database '{}' is up to date.", config.path.display());
        return Ok(());
    }
    println!("Reconcile complete:");
    for table in &report.tables_created {
        println!("  created table {table}");
    }
    for (table, field) in &report.columns_added {
        println!("  added column {table}.{field}");
    }
    Ok(())
}

fn run_inspect(config: Option<PathBuf>, args: InspectArgs) -> Result<(), String> {
    let config = resolve_config(config, args.db)?;
    let mut connector =
        Connector::from_config(&config, Database::new()).with_create_if_missing(false);
    connector
        .connect()
        .map_err(|e| format!("Failed to open database '{}': {e}", config.path.display()))?;
    connector
        .load_structure_from_database()
        .map_err(|e| format!("Failed to read structure: {e}"))?;

    let declaration = connector.schema().to_declaration();
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&declaration)
            .map_err(|e| format!("Failed to render JSON: {e}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&declaration)
            .map_err(|e| format!("Failed to render YAML: {e}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_select(config: Option<PathBuf>, args: SelectArgs) -> Result<(), String> {
    let config = resolve_config(config, args.db)?;
    let mut connector =
        Connector::from_config(&config, Database::new()).with_create_if_missing(false);
    connector
        .connect()
        .map_err(|e| format!("Failed to open database '{}': {e}", config.path.display()))?;

    let op = Operator::new(&mut connector);
    let rows = op
        .select_advanced(
            &args.fields,
            &args.table,
            args.condition.as_deref().map(|c| format!("WHERE {c}")).as_deref(),
        )
        .map_err(|e| format!("Select failed: {e}"))?;
    let rendered =
        serde_json::to_string_pretty(&rows).map_err(|e| format!("Failed to render JSON: {e}"))?;
    println!("{rendered}");
    Ok(())
}
