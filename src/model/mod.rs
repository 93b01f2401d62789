//! In-memory data model: databases, tables, and rows.
//!
//! The model is pure state plus invariant-preserving operations; persistence
//! lives in [`crate::store`] and policy (locking, error taxonomy) in
//! [`crate::db`].

mod database;
mod table;

pub use database::{Database, IntersectError};
pub use table::{Row, Table, ValidationError};
