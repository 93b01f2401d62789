//! Databases: named collections of tables.

use std::collections::BTreeMap;

use thiserror::Error;

use super::table::{Row, Table};
use crate::schema::Schema;

/// Errors from the two-table intersection query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntersectError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table schemas are not equal: {left} vs {right}")]
    SchemaMismatch { left: String, right: String },
}

/// A named database: a unique-keyed map of table name to [`Table`].
///
/// Databases are constructed empty or reconstructed from their persisted
/// form; there is no delete-database operation.
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    tables: BTreeMap<String, Table>,
}

impl Database {
    /// Create an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Reconstruct a database from its persisted tables.
    pub fn from_tables(name: impl Into<String>, tables: BTreeMap<String, Table>) -> Self {
        Self {
            name: name.into(),
            tables,
        }
    }

    /// The database name, doubling as its storage key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an empty table. Returns false (and changes nothing) when a
    /// table with that name already exists.
    pub fn add_table(&mut self, name: impl Into<String>, schema: Schema) -> bool {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return false;
        }
        self.tables.insert(name, Table::new(schema));
        true
    }

    /// Remove a table. Returns false when it does not exist.
    pub fn delete_table(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// Look up a table.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Look up a table for mutation.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Names of all current tables.
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// All tables keyed by name, for persistence.
    pub fn tables(&self) -> &BTreeMap<String, Table> {
        &self.tables
    }

    /// Rows of `left` that equal at least one row of `right`, in `left`'s
    /// row order.
    ///
    /// Multiset semantics: a row occurring twice in `left` that matches
    /// anything in `right` appears twice in the result. Schemas must match
    /// field-for-field (declaration order is ignored).
    pub fn intersect(&self, left: &str, right: &str) -> Result<Vec<Row>, IntersectError> {
        let left_table = self
            .get_table(left)
            .ok_or_else(|| IntersectError::TableNotFound(left.to_string()))?;
        let right_table = self
            .get_table(right)
            .ok_or_else(|| IntersectError::TableNotFound(right.to_string()))?;

        if !left_table.schema().matches(right_table.schema()) {
            return Err(IntersectError::SchemaMismatch {
                left: left.to_string(),
                right: right.to_string(),
            });
        }

        Ok(left_table
            .rows()
            .iter()
            .filter(|row| right_table.contains(row))
            .cloned()
            .collect())
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

    fn insert(db: &mut Database, table: &str, row: serde_json::Value) {
        db.get_table_mut(table)
            .unwrap()
            .add_row(row.as_object().unwrap())
            .unwrap();
    }

    #[test]
    fn test_add_and_list_tables() {
        let mut db = Database::new("testdb");
        assert!(db.list_tables().is_empty());

        assert!(db.add_table("users", users_schema()));
        assert!(db.add_table("orders", users_schema()));
        assert_eq!(db.list_tables(), vec!["orders", "users"]);
    }

    #[test]
    fn test_add_table_twice_fails_without_clobbering() {
        let mut db = Database::new("testdb");
        assert!(db.add_table("users", users_schema()));
        insert(&mut db, "users", json!({"id": "1", "name": "Alice"}));

        let other = Schema::builder()
            .field("email", TypeTag::String)
            .build()
            .unwrap();
        assert!(!db.add_table("users", other));

        // First table untouched.
        let table = db.get_table("users").unwrap();
        assert_eq!(table.schema(), &users_schema());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_delete_table() {
        let mut db = Database::new("testdb");
        assert!(!db.delete_table("users"));

        db.add_table("users", users_schema());
        assert!(db.delete_table("users"));
        assert!(db.get_table("users").is_none());
    }

    #[test]
    fn test_intersect_preserves_left_order() {
        let mut db = Database::new("testdb");
        db.add_table("t1", users_schema());
        db.add_table("t2", users_schema());

        insert(&mut db, "t1", json!({"id": "1", "name": "Alice"}));
        insert(&mut db, "t1", json!({"id": "2", "name": "Bob"}));
        insert(&mut db, "t2", json!({"id": "2", "name": "Bob"}));
        insert(&mut db, "t2", json!({"id": "3", "name": "Charlie"}));

        let rows = db.intersect("t1", "t2").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Bob")));

        // Content is symmetric; order follows the first table.
        let rows = db.intersect("t2", "t1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&json!("2")));
    }

    #[test]
    fn test_intersect_keeps_duplicates() {
        let mut db = Database::new("testdb");
        db.add_table("t1", users_schema());
        db.add_table("t2", users_schema());

        insert(&mut db, "t1", json!({"id": "1", "name": "Alice"}));
        insert(&mut db, "t1", json!({"id": "1", "name": "Alice"}));
        insert(&mut db, "t2", json!({"id": "1", "name": "Alice"}));

        let rows = db.intersect("t1", "t2").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_intersect_schema_mismatch() {
        let mut db = Database::new("testdb");
        db.add_table("t1", users_schema());
        db.add_table(
            "t2",
            Schema::builder()
                .field("id", TypeTag::String)
                .field("name", TypeTag::String)
                .build()
                .unwrap(),
        );

        let err = db.intersect("t1", "t2").unwrap_err();
        assert!(matches!(err, IntersectError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_intersect_ignores_field_order() {
        let mut db = Database::new("testdb");
        db.add_table("t1", users_schema());
        db.add_table(
            "t2",
            Schema::builder()
                .field("name", TypeTag::String)
                .field("id", TypeTag::Integer)
                .build()
                .unwrap(),
        );

        insert(&mut db, "t1", json!({"id": "2", "name": "Bob"}));
        insert(&mut db, "t2", json!({"id": "2", "name": "Bob"}));

        assert_eq!(db.intersect("t1", "t2").unwrap().len(), 1);
    }

    #[test]
    fn test_intersect_missing_table() {
        let db = Database::new("testdb");
        assert_eq!(
            db.intersect("a", "b"),
            Err(IntersectError::TableNotFound("a".to_string()))
        );
    }
}
