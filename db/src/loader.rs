//! Declaration loading from files and directories.
//!
//! Declarations may be written as JSON (`.json`) or YAML (`.yaml`, `.yml`).
//! A directory is loaded by merging every declaration file in it, in file
//! name order, so a schema can be split across files.
//!
//! ```no_run
//! use table_schema_db::{DeclarationLoader, load_database};
//!
//! // A single file
//! let decl = DeclarationLoader::load_file("schema.yaml").unwrap();
//! println!("{} tables declared", decl.tables.len());
//!
//! // File or directory, straight to a validated model
//! let db = load_database("schemas/").unwrap();
//! for name in db.table_names() {
//!     println!("  {name}");
//! }
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use table_schema_core::{Database, SchemaDeclaration};

use crate::error::{LoadError, Result};

/// Declaration file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl DeclarationFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Loads [`SchemaDeclaration`]s from disk.
pub struct DeclarationLoader;

impl DeclarationLoader {
    /// Loads a single declaration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for unknown extensions,
    /// [`LoadError::IoError`] if the file cannot be read, or a JSON / YAML
    /// error if parsing fails.
    pub fn load_file(path: impl AsRef<Path>) -> Result<SchemaDeclaration> {
        let path = path.as_ref();
        let format = DeclarationFormat::from_path(path)
            .ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let decl = match format {
            DeclarationFormat::Json => serde_json::from_reader(reader)?,
            DeclarationFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(decl)
    }

    /// Parses a declaration from a string in the given format.
    pub fn parse(text: &str, format: DeclarationFormat) -> Result<SchemaDeclaration> {
        let decl = match format {
            DeclarationFormat::Json => serde_json::from_str(text)?,
            DeclarationFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(decl)
    }

    /// Merges every declaration file in a directory.
    ///
    /// Files with other extensions are ignored. Files are read in name
    /// order, which fixes the resulting table order.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DuplicateTable`] if two files declare the same
    /// table, or any error from [`load_file`](Self::load_file).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<SchemaDeclaration> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        files.retain(|p| p.is_file() && DeclarationFormat::from_path(p).is_some());
        files.sort();

        let mut merged = SchemaDeclaration::new();
        for file in &files {
            for (table, decl) in Self::load_file(file)?.tables {
                if merged.tables.contains_key(&table) {
                    return Err(LoadError::DuplicateTable {
                        table,
                        path: file.clone(),
                    });
                }
                merged.tables.insert(table, decl);
            }
        }
        Ok(merged)
    }

    /// Loads a file or a directory, depending on what `path` is.
    pub fn load(path: impl AsRef<Path>) -> Result<SchemaDeclaration> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::load_file(path)
        }
    }
}

/// Loads a declaration file or directory and builds the schema model.
///
/// # Errors
///
/// Any loading error, or [`LoadError::SchemaError`] if a field declaration
/// is malformed or a table is structurally invalid.
pub fn load_database(path: impl AsRef<Path>) -> Result<Database> {
    let decl = DeclarationLoader::load(path)?;
    Ok(Database::from_declaration(&decl)?)
}
