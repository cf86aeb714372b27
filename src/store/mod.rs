//! Key-value persistence.
//!
//! The scan history lives under a single key as a JSON document. Anything
//! that can get, set and remove a string by key can back it:
//! - `SqliteStore`: a `kv` table in a local SQLite database (the CLI default)
//! - `MemoryStore`: a plain map, for tests and throwaway sessions

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the whole value stored under `key`. Must be atomic per call.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
