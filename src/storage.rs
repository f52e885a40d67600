//! Schema storage
//!
//! Saved schemas are plain `.xsd`/`.xml` files in one directory. Callers
//! address them by filename; the engine itself only ever sees their text.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::limits::Limits;

/// Extensions of stored schema files
pub const SCHEMA_EXTENSIONS: &[&str] = &["xsd", "xml"];

/// A stored schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    /// File name, extension included
    pub filename: String,
    /// File name without its extension
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Persistence for schema texts
pub trait SchemaStorage {
    /// All stored schemas, sorted by filename
    fn list(&self) -> Result<Vec<SchemaEntry>>;

    /// Text of a stored schema
    fn read(&self, filename: &str) -> Result<String>;

    /// Store a schema under `name`; returns the filename used
    fn write(&self, name: &str, content: &str) -> Result<String>;

    /// Rename a stored schema; returns the new filename
    fn rename(&self, old: &str, new: &str) -> Result<String>;

    /// Delete a stored schema
    fn delete(&self, filename: &str) -> Result<()>;
}

/// Schemas stored as files in a directory
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    dir: PathBuf,
    limits: Limits,
}

impl DirectoryStorage {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            limits: Limits::default(),
        })
    }

    /// Set the limits applied when reading schemas
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The storage directory
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_of(&self, filename: &str) -> Result<PathBuf> {
        check_filename(filename)?;
        Ok(self.dir.join(filename))
    }
}

impl SchemaStorage for DirectoryStorage {
    fn list(&self) -> Result<Vec<SchemaEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let filename = match entry.file_name().into_string() {
                Ok(filename) => filename,
                Err(name) => {
                    warn!(file = ?name, "skipping file with a non UTF-8 name");
                    continue;
                }
            };
            let Some(name) = strip_schema_extension(&filename) else {
                debug!(file = %filename, "skipping non-schema file");
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(SchemaEntry {
                name: name.to_string(),
                size: metadata.len(),
                filename,
            });
        }
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    fn read(&self, filename: &str) -> Result<String> {
        let path = self.path_of(filename)?;
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(filename.to_string()),
            _ => Error::Io(e),
        })?;
        self.limits.check_xml_size(content.len())?;
        Ok(content)
    }

    fn write(&self, name: &str, content: &str) -> Result<String> {
        let filename = schema_filename(name);
        let path = self.path_of(&filename)?;
        fs::write(&path, content)?;
        debug!(file = %filename, bytes = content.len(), "schema saved");
        Ok(filename)
    }

    fn rename(&self, old: &str, new: &str) -> Result<String> {
        let old_path = self.path_of(old)?;
        let new_filename = match old.rsplit_once('.') {
            Some((_, ext)) if !new.ends_with(&format!(".{}", ext)) => format!("{}.{}", new, ext),
            _ => new.to_string(),
        };
        let new_path = self.path_of(&new_filename)?;

        if !old_path.is_file() {
            return Err(Error::NotFound(old.to_string()));
        }
        if new_path.exists() {
            return Err(Error::AlreadyExists(new_filename));
        }

        fs::rename(&old_path, &new_path)?;
        debug!(from = %old, to = %new_filename, "schema renamed");
        Ok(new_filename)
    }

    fn delete(&self, filename: &str) -> Result<()> {
        let path = self.path_of(filename)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(filename.to_string()),
            _ => Error::Io(e),
        })?;
        debug!(file = %filename, "schema deleted");
        Ok(())
    }
}

/// Name without a `.xsd`/`.xml` extension; `None` for other files
pub fn strip_schema_extension(filename: &str) -> Option<&str> {
    SCHEMA_EXTENSIONS
        .iter()
        .find_map(|ext| filename.strip_suffix(&format!(".{}", ext)))
}

/// Filename for an uploaded schema: `.xsd` is kept, anything else is stored as `.xml`
pub fn schema_filename(name: &str) -> String {
    if name.ends_with(".xsd") {
        return name.to_string();
    }
    let stem = strip_schema_extension(name).unwrap_or(name);
    format!("{}.xml", stem)
}

fn check_filename(filename: &str) -> Result<()> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0');
    if invalid {
        return Err(Error::Storage(format!("invalid schema filename '{}'", filename)));
    }
    Ok(())
}
