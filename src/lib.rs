//! shelfdb - a minimal file-backed record database.
//!
//! Named databases hold named tables; every table carries a fixed, typed
//! schema and an ordered sequence of rows. Each database persists as a single
//! JSON file under a data directory, and every mutation rewrites that file in
//! full.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use shelfdb::db::Engine;
//! use shelfdb::schema::{Schema, TypeTag};
//!
//! let engine = Engine::open("./databases").unwrap();
//! engine.create_database("testdb").unwrap();
//!
//! let schema = Schema::builder()
//!     .field("id", TypeTag::Integer)
//!     .field("name", TypeTag::String)
//!     .build()
//!     .unwrap();
//! engine.create_table("testdb", "users", schema).unwrap();
//!
//! let row = json!({"id": "1", "name": "Alice"});
//! engine.insert_row("testdb", "users", row.as_object().unwrap()).unwrap();
//! ```

pub mod db;
pub mod model;
pub mod schema;
pub mod store;
