//! Engine - high-level interface for shelfdb.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{IntersectError, Row, ValidationError};
use crate::schema::Schema;
use crate::store::{DatabaseName, FileStore, NameError, StoreError};

/// Result type for engine operations.
pub type DbResult<T> = Result<T, DbError>;

/// The full failure taxonomy an outer layer maps onto its wire format.
///
/// Every variant is local and retryable; no operation leaves a partially
/// applied mutation behind on failure.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    #[error("database already exists: {0}")]
    DatabaseExists(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("table schemas are not equal: {left} vs {right}")]
    SchemaMismatch { left: String, right: String },

    #[error("row {position} out of range")]
    RowOutOfRange { position: usize },

    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<IntersectError> for DbError {
    fn from(err: IntersectError) -> Self {
        match err {
            IntersectError::TableNotFound(name) => DbError::TableNotFound(name),
            IntersectError::SchemaMismatch { left, right } => {
                DbError::SchemaMismatch { left, right }
            }
        }
    }
}

/// Engine configuration options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding one JSON file per database.
    pub dir: PathBuf,
    /// Log operations to stderr.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("databases"),
            verbose: false,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with the given data directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Set the verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }
}

/// The main database engine handle.
///
/// An engine owns one store directory and performs every operation as
/// exists-check, load, mutate, save. The load-mutate-save sequence runs under
/// a per-database-name mutex, so callers sharing one engine cannot lose
/// updates to each other. Two engines (or processes) over the same directory
/// still race: last save wins.
pub struct Engine {
    config: EngineConfig,
    store: FileStore,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    // Keeps the backing directory of an ephemeral engine alive.
    _temp: Option<tempfile::TempDir>,
}

impl Engine {
    /// Open an engine over the given data directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> DbResult<Self> {
        Self::open_with_config(EngineConfig::new(dir))
    }

    /// Open an engine with custom configuration.
    pub fn open_with_config(config: EngineConfig) -> DbResult<Self> {
        let store = FileStore::open(&config.dir)?;
        Ok(Self {
            config,
            store,
            locks: Mutex::new(HashMap::new()),
            _temp: None,
        })
    }

    /// Create an engine over a temporary directory (for tests and demos).
    pub fn ephemeral() -> DbResult<Self> {
        let dir = tempfile::TempDir::new().map_err(StoreError::Io)?;
        let mut engine = Self::open(dir.path())?;
        engine._temp = Some(dir);
        Ok(engine)
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Create a new empty database.
    pub fn create_database(&self, db: &str) -> DbResult<()> {
        if self.config.verbose {
            eprintln!("[shelfdb] create database {}", db);
        }
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        if !self.store.create(&name)? {
            return Err(DbError::DatabaseExists(db.to_string()));
        }
        Ok(())
    }

    /// Names of all persisted databases, sorted.
    pub fn list_databases(&self) -> DbResult<Vec<String>> {
        Ok(self.store.list()?)
    }

    /// Whether a database has a persisted form.
    ///
    /// Invalid names cannot have one, so they report false rather than error.
    pub fn database_exists(&self, db: &str) -> bool {
        DatabaseName::new(db)
            .map(|name| self.store.exists(&name))
            .unwrap_or(false)
    }

    /// Create an empty table with the given schema.
    pub fn create_table(&self, db: &str, table: &str, schema: Schema) -> DbResult<()> {
        if self.config.verbose {
            eprintln!("[shelfdb] create table {}.{}", db, table);
        }
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        let mut database = self.load_existing(&name)?;
        if !database.add_table(table, schema) {
            return Err(DbError::TableExists(table.to_string()));
        }
        self.store.save(&database)?;
        Ok(())
    }

    /// Remove a table and all its rows.
    pub fn drop_table(&self, db: &str, table: &str) -> DbResult<()> {
        if self.config.verbose {
            eprintln!("[shelfdb] drop table {}.{}", db, table);
        }
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        let mut database = self.load_existing(&name)?;
        if !database.delete_table(table) {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        self.store.save(&database)?;
        Ok(())
    }

    /// Names of all tables in a database.
    pub fn list_tables(&self, db: &str) -> DbResult<Vec<String>> {
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        Ok(self.load_existing(&name)?.list_tables())
    }

    /// A table's schema.
    pub fn table_schema(&self, db: &str, table: &str) -> DbResult<Schema> {
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        let database = self.load_existing(&name)?;
        let table = database
            .get_table(table)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        Ok(table.schema().clone())
    }

    /// Validate and append a row.
    pub fn insert_row(&self, db: &str, table: &str, row: &Map<String, Value>) -> DbResult<()> {
        if self.config.verbose {
            eprintln!("[shelfdb] insert into {}.{}", db, table);
        }
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        let mut database = self.load_existing(&name)?;
        database
            .get_table_mut(table)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?
            .add_row(row)?;
        self.store.save(&database)?;
        Ok(())
    }

    /// Delete the row at `position`. Later rows shift down by one.
    pub fn delete_row(&self, db: &str, table: &str, position: usize) -> DbResult<()> {
        if self.config.verbose {
            eprintln!("[shelfdb] delete row {} from {}.{}", position, db, table);
        }
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        let mut database = self.load_existing(&name)?;
        let found = database
            .get_table_mut(table)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?
            .delete_row(position)
            .is_some();
        if !found {
            return Err(DbError::RowOutOfRange { position });
        }
        self.store.save(&database)?;
        Ok(())
    }

    /// All rows of a table, in insertion order.
    pub fn rows(&self, db: &str, table: &str) -> DbResult<Vec<Row>> {
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        let database = self.load_existing(&name)?;
        let table = database
            .get_table(table)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        Ok(table.rows().to_vec())
    }

    /// Rows of `left` that also occur in `right`; see
    /// [`crate::model::Database::intersect`].
    pub fn intersect(&self, db: &str, left: &str, right: &str) -> DbResult<Vec<Row>> {
        let name = DatabaseName::new(db)?;
        let lock = self.lock_for(name.as_str());
        let _guard = lock.lock();

        Ok(self.load_existing(&name)?.intersect(left, right)?)
    }

    /// Load a database that must already exist.
    ///
    /// The store's load never fails on a missing file, so existence is the
    /// engine's check to make.
    fn load_existing(&self, name: &DatabaseName) -> DbResult<crate::model::Database> {
        if !self.store.exists(name) {
            return Err(DbError::DatabaseNotFound(name.as_str().to_string()));
        }
        Ok(self.store.load(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeTag;
    use serde_json::json;

    fn users_schema() -> Schema {
        Schema::builder()
            .field("id", TypeTag::Integer)
            .field("name", TypeTag::String)
            .build()
            .unwrap()
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_and_list_databases() {
        let engine = Engine::ephemeral().unwrap();
        assert!(engine.list_databases().unwrap().is_empty());
        assert!(!engine.database_exists("testdb"));

        engine.create_database("testdb").unwrap();
        assert!(engine.database_exists("testdb"));
        assert_eq!(engine.list_databases().unwrap(), vec!["testdb"]);

        let err = engine.create_database("testdb").unwrap_err();
        assert!(matches!(err, DbError::DatabaseExists(_)));
    }

    #[test]
    fn test_invalid_database_name() {
        let engine = Engine::ephemeral().unwrap();
        let err = engine.create_database("../escape").unwrap_err();
        assert!(matches!(err, DbError::InvalidName(_)));
        assert!(!engine.database_exists("../escape"));
    }

    #[test]
    fn test_operations_require_existing_database() {
        let engine = Engine::ephemeral().unwrap();
        let err = engine
            .create_table("ghost", "users", users_schema())
            .unwrap_err();
        assert!(matches!(err, DbError::DatabaseNotFound(_)));

        let err = engine.list_tables("ghost").unwrap_err();
        assert!(matches!(err, DbError::DatabaseNotFound(_)));
    }

    #[test]
    fn test_table_lifecycle() {
        let engine = Engine::ephemeral().unwrap();
        engine.create_database("testdb").unwrap();

        engine.create_table("testdb", "users", users_schema()).unwrap();
        assert_eq!(engine.list_tables("testdb").unwrap(), vec!["users"]);
        assert_eq!(engine.table_schema("testdb", "users").unwrap(), users_schema());

        let err = engine
            .create_table("testdb", "users", users_schema())
            .unwrap_err();
        assert!(matches!(err, DbError::TableExists(_)));

        engine.drop_table("testdb", "users").unwrap();
        assert!(engine.list_tables("testdb").unwrap().is_empty());

        let err = engine.drop_table("testdb", "users").unwrap_err();
        assert!(matches!(err, DbError::TableNotFound(_)));
    }

    #[test]
    fn test_row_lifecycle_end_to_end() {
        let engine = Engine::ephemeral().unwrap();
        engine.create_database("testdb").unwrap();
        engine.create_table("testdb", "users", users_schema()).unwrap();

        engine
            .insert_row("testdb", "users", &obj(json!({"id": "1", "name": "Alice"})))
            .unwrap();
        assert_eq!(engine.rows("testdb", "users").unwrap().len(), 1);

        // Failed validation leaves the table untouched.
        let err = engine
            .insert_row("testdb", "users", &obj(json!({"id": "abc", "name": "Bob"})))
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::InvalidValue(ref f)) if f == "id"
        ));
        assert_eq!(engine.rows("testdb", "users").unwrap().len(), 1);

        engine.delete_row("testdb", "users", 0).unwrap();
        assert!(engine.rows("testdb", "users").unwrap().is_empty());

        let err = engine.delete_row("testdb", "users", 0).unwrap_err();
        assert!(matches!(err, DbError::RowOutOfRange { position: 0 }));
    }

    #[test]
    fn test_failed_insert_not_persisted() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let engine = Engine::open(dir.path()).unwrap();
            engine.create_database("testdb").unwrap();
            engine.create_table("testdb", "users", users_schema()).unwrap();
            engine
                .insert_row("testdb", "users", &obj(json!({"name": "NoId"})))
                .unwrap_err();
        }
        // Reopen: nothing from the failed insert reached disk.
        let engine = Engine::open(dir.path()).unwrap();
        assert!(engine.rows("testdb", "users").unwrap().is_empty());
    }

    #[test]
    fn test_intersect_end_to_end() {
        let engine = Engine::ephemeral().unwrap();
        engine.create_database("testdb").unwrap();
        engine.create_table("testdb", "t1", users_schema()).unwrap();
        engine.create_table("testdb", "t2", users_schema()).unwrap();

        for (table, id, name) in [
            ("t1", "1", "Alice"),
            ("t1", "2", "Bob"),
            ("t2", "2", "Bob"),
            ("t2", "3", "Charlie"),
        ] {
            engine
                .insert_row("testdb", table, &obj(json!({"id": id, "name": name})))
                .unwrap();
        }

        let rows = engine.intersect("testdb", "t1", "t2").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Bob")));
    }

    #[test]
    fn test_intersect_schema_mismatch() {
        let engine = Engine::ephemeral().unwrap();
        engine.create_database("testdb").unwrap();
        engine.create_table("testdb", "t1", users_schema()).unwrap();
        engine
            .create_table(
                "testdb",
                "t2",
                Schema::builder().field("id", TypeTag::Integer).build().unwrap(),
            )
            .unwrap();

        let err = engine.intersect("testdb", "t1", "t2").unwrap_err();
        assert!(matches!(err, DbError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let engine = Engine::open(dir.path()).unwrap();
            engine.create_database("testdb").unwrap();
            engine.create_table("testdb", "users", users_schema()).unwrap();
            engine
                .insert_row("testdb", "users", &obj(json!({"id": "1", "name": "Alice"})))
                .unwrap();
        }

        let engine = Engine::open(dir.path()).unwrap();
        assert!(engine.database_exists("testdb"));
        let rows = engine.rows("testdb", "users").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&json!("1")));
    }
}
