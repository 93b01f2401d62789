//! Tables: a fixed schema plus an ordered sequence of validated rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::Schema;

/// One record, restricted to exactly the fields its table's schema declares.
///
/// Values keep the representation they arrived with; validation checks that
/// they coerce to the declared type but never normalizes them.
pub type Row = BTreeMap<String, Value>;

/// Row validation failures, naming the offending field.
///
/// Only the first offending field in schema order is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field {0} is missing")]
    MissingField(String),

    #[error("invalid value for field {0}")]
    InvalidValue(String),
}

/// A named table's contents: schema and rows.
///
/// The schema is fixed for the table's lifetime. Row identity is positional;
/// deleting a row shifts every later row down by one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// The table's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate and append a row.
    ///
    /// Walks the schema in declaration order and fails on the first field
    /// that is absent from `data` or whose value does not validate. Keys in
    /// `data` that the schema does not declare are silently dropped. On
    /// failure the table is unchanged.
    pub fn add_row(&mut self, data: &Map<String, Value>) -> Result<(), ValidationError> {
        let mut row = Row::new();
        for field in self.schema.fields() {
            let value = data
                .get(&field.name)
                .ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
            if !field.tag.validates(value) {
                return Err(ValidationError::InvalidValue(field.name.clone()));
            }
            row.insert(field.name.clone(), value.clone());
        }
        self.rows.push(row);
        Ok(())
    }

    /// Remove the row at `position`, returning it.
    ///
    /// Out-of-range positions return `None` and leave the table unchanged.
    pub fn delete_row(&mut self, position: usize) -> Option<Row> {
        if position < self.rows.len() {
            Some(self.rows.remove(position))
        } else {
            None
        }
    }

    /// All rows in insertion order (positions reflect prior deletions).
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether some row equals `row` in every field.
    pub fn contains(&self, row: &Row) -> bool {
        self.rows.contains(row)
    }
}
