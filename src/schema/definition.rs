//! Table schemas: ordered field declarations.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::types::TypeTag;

/// One declared field: a name and its type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub tag: TypeTag,
}

/// An ordered mapping of field name to type tag, fixed at table creation.
///
/// Declaration order matters for row validation (the first offending field in
/// schema order is the one reported) and is preserved through the persisted
/// JSON form. It does not matter for schema compatibility checks; see
/// [`Schema::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up the tag declared for a field.
    pub fn get(&self, name: &str) -> Option<TypeTag> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.tag)
    }

    /// Compatibility check for cross-table queries: same fields with the same
    /// tags, regardless of declaration order.
    pub fn matches(&self, other: &Schema) -> bool {
        if self.fields.len() != other.fields.len() {
            return false;
        }
        self.fields
            .iter()
            .all(|f| other.get(&f.name) == Some(f.tag))
    }
}

/// Schema construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("schema declares no fields")]
    Empty,
}

/// Builder for [`Schema`].
pub struct SchemaBuilder {
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field declaration.
    pub fn field(mut self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            tag,
        });
        self
    }

    /// Finish, rejecting empty schemas and duplicate field names.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for f in &self.fields {
            if !seen.insert(f.name.as_str()) {
                return Err(SchemaError::DuplicateField(f.name.clone()));
            }
        }
        Ok(Schema {
            fields: self.fields,
        })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// The persisted form is the plain JSON object `{"field": "tag", ...}`.
// Serialization walks fields in declaration order; deserialization keeps the
// order the map arrives in.

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for f in &self.fields {
            map.serialize_entry(&f.name, &f.tag)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of field name to type tag")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Schema, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut builder = Schema::builder();
                while let Some((name, tag)) = access.next_entry::<String, TypeTag>()? {
                    builder = builder.field(name, tag);
                }
                builder.build().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
