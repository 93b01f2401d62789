//! Schema module: field type tags and table schemas.
//!
//! A schema is an ordered mapping of field name to [`TypeTag`], fixed when a
//! table is created. Field values stay untyped (`serde_json::Value`) until
//! they are checked against their declared tag.

mod definition;
mod types;

pub use definition::{FieldDef, Schema, SchemaBuilder, SchemaError};
pub use types::{validate, TypeTag, UnknownTypeTag};
