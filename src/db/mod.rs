//! High-level engine facade.
//!
//! This is the surface an outer request-handling layer (HTTP, CLI) talks to:
//! every core operation as one call, each a full load-mutate-save cycle
//! against the store.

mod api;

pub use api::{DbError, DbResult, Engine, EngineConfig};
