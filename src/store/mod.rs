//! Persistence boundary: one JSON file per database.
//!
//! The store maps a database name to `{dir}/{name}.json` and always reads and
//! writes a database in full. There is no incremental persistence and no
//! partial-write recovery; a save replaces whatever was on disk.

mod error;
mod file;
mod name;

pub use error::StoreError;
pub use file::FileStore;
pub use name::{DatabaseName, NameError};
