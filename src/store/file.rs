//! File-backed database store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::name::DatabaseName;
use crate::model::{Database, Table};

/// On-disk shape of one database file: a map of table name to table.
///
/// The database name is not stored; it is the file stem.
#[derive(Deserialize)]
struct DatabaseFile {
    tables: BTreeMap<String, Table>,
}

/// Stores each database as `{dir}/{name}.json`.
///
/// Reads and writes are whole-file and synchronous. The store itself does no
/// locking; [`crate::db::Engine`] serializes read-modify-write sequences per
/// database name.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &DatabaseName) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Whether a persisted form exists for `name`.
    pub fn exists(&self, name: &DatabaseName) -> bool {
        self.path_for(name).is_file()
    }

    /// Load a database.
    ///
    /// A missing file yields a fresh empty database rather than an error;
    /// callers that care about existence check [`FileStore::exists`] first.
    pub fn load(&self, name: &DatabaseName) -> Result<Database, StoreError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(Database::new(name.as_str()));
        }
        let text = fs::read_to_string(path)?;
        let file: DatabaseFile = serde_json::from_str(&text)?;
        Ok(Database::from_tables(name.as_str(), file.tables))
    }

    /// Persist a database in full, replacing any prior form.
    pub fn save(&self, database: &Database) -> Result<(), StoreError> {
        let name = DatabaseName::new(database.name())?;
        let file = BorrowedDatabaseFile {
            tables: database.tables(),
        };
        let text = serde_json::to_string_pretty(&file)?;
        fs::write(self.path_for(&name), text)?;
        Ok(())
    }

    /// Persist a fresh empty database. Returns false when one already exists.
    pub fn create(&self, name: &DatabaseName) -> Result<bool, StoreError> {
        if self.exists(name) {
            return Ok(false);
        }
        self.save(&Database::new(name.as_str()))?;
        Ok(true)
    }

    /// Names of all databases with a persisted form, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Serialization view over a borrowed database, mirroring [`DatabaseFile`].
#[derive(Serialize)]
struct BorrowedDatabaseFile<'a> {
    tables: &'a BTreeMap<String, Table>,
}
