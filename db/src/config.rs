//! Connection configuration.
//!
//! Defines the YAML/JSON-serializable settings that control how a database
//! file is opened, committed and released.
//!
//! # Example YAML
//!
//! ```yaml
//! path: data/app.db
//! create_if_missing: true
//! commit_on_close: true
//! auto_commit:
//!   enabled: true
//!   interval: 100
//! declaration: schema.yaml
//! ```
//!
//! Every key except `path` is optional.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::DeclarationFormat;

/// Default number of mutating statements between automatic commits.
pub const DEFAULT_AUTO_COMMIT_INTERVAL: u32 = 10;

/// Periodic commit settings.
///
/// When enabled, a commit is issued once more than `interval` mutating
/// statements have run since the last commit.
///
/// # Examples
///
/// ```
/// # use table_schema_db::AutoCommitConfig;
/// let auto = AutoCommitConfig::default();
/// assert!(!auto.enabled);
/// assert_eq!(auto.interval, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCommitConfig {
    /// Whether periodic commits are issued.
    pub enabled: bool,
    /// Mutating statements allowed between commits.
    pub interval: u32,
}

impl Default for AutoCommitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_AUTO_COMMIT_INTERVAL,
        }
    }
}

fn default_true() -> bool {
    true
}

/// How to open and release one database file.
///
/// # Examples
///
/// ```no_run
/// use table_schema_db::ConnectionConfig;
///
/// let config = ConnectionConfig::load("connection.yaml").unwrap();
/// println!("database at {}", config.path.display());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database file path, or `:memory:`.
    pub path: PathBuf,
    /// Create the file if it does not exist.
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
    /// Commit outstanding changes when the connection is released.
    #[serde(default = "default_true")]
    pub commit_on_close: bool,
    /// Periodic commit settings.
    #[serde(default)]
    pub auto_commit: AutoCommitConfig,
    /// Declaration file or directory describing the expected schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<PathBuf>,
}

impl ConnectionConfig {
    /// Creates a configuration with defaults for everything but the path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: true,
            commit_on_close: true,
            auto_commit: AutoCommitConfig::default(),
            declaration: None,
        }
    }

    /// Loads configuration from a YAML or JSON file (by extension; anything
    /// that is not `.json` is read as YAML).
    ///
    /// A relative `declaration` path is resolved against the config file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot be
    /// read, or a JSON / YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut config: Self = match DeclarationFormat::from_path(path) {
            Some(DeclarationFormat::Json) => serde_json::from_reader(reader)?,
            _ => serde_yaml::from_reader(reader)?,
        };
        if let (Some(decl), Some(base)) = (config.declaration.as_mut(), path.parent()) {
            if decl.is_relative() {
                *decl = base.join(&*decl);
            }
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::LoadError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` for an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}
