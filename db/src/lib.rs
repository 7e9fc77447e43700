//! Declaration loading and connection configuration for table schemas.
//!
//! This crate reads [`SchemaDeclaration`](table_schema_core::SchemaDeclaration)s
//! from JSON or YAML files (or whole directories of them) and provides the
//! [`ConnectionConfig`] consumed by the SQLite connector.
//!
//! # Quick start
//!
//! ```no_run
//! use table_schema_db::{ConnectionConfig, load_database};
//!
//! let config = ConnectionConfig::load("connection.yaml").unwrap();
//! let db = load_database(config.declaration.as_ref().unwrap()).unwrap();
//! println!("{} tables declared for {}", db.len(), config.path.display());
//! ```

mod config;
mod error;
mod loader;

pub use config::{AutoCommitConfig, ConnectionConfig, DEFAULT_AUTO_COMMIT_INTERVAL};
pub use error::{LoadError, Result};
pub use loader::{DeclarationFormat, DeclarationLoader, load_database};
