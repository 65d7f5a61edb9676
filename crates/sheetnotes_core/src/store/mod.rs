//! Flag-storage boundary: the per-parent key-value store.
//!
//! # Responsibility
//! - Define the `get_field`/`set_field` contract managers operate on.
//! - Isolate SQLite details behind the store boundary.
//!
//! # Invariants
//! - Values are read and fully rewritten as whole JSON documents; storage is
//!   never patched field-by-field.
//! - The load-mutate-store sequence above this trait is not atomic;
//!   concurrent writers for one parent are last-writer-wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
mod open;
pub mod schema;
mod sqlite;

pub use memory::MemoryFlagStore;
pub use open::{open_store, open_store_in_memory};
pub use sqlite::SqliteFlagStore;

use crate::FLAG_SCOPE;

/// Flag key holding a parent's category list.
pub const CATEGORIES_KEY: &str = "categories";
/// Flag key holding a parent's note list.
pub const NOTES_KEY: &str = "notes";
/// Flag key holding a parent's data schema version.
pub const VERSION_KEY: &str = "version";
/// Flag key holding the manual category ordering hint.
pub const CATEGORY_ORDER_KEY: &str = "categoryOrder";

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level storage failure.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    /// Stored schema is newer than this build understands.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "invalid stored flag value: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Per-parent key-value storage primitive.
///
/// Mirrors the host's flag API: one opaque JSON value per
/// (parent, scope, key) triple. Object-safe so migration procedures can
/// dispatch through `&mut dyn FlagStore`.
pub trait FlagStore {
    /// Reads one flag value, `None` when the key was never set.
    fn get_field(&self, parent: &str, scope: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Writes one flag value, replacing any previous value wholesale.
    fn set_field(&mut self, parent: &str, scope: &str, key: &str, value: &Value)
        -> StoreResult<()>;
}

/// Reads one typed flag from this crate's scope.
pub fn read_flag<T, S>(store: &S, parent: &str, key: &str) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    S: FlagStore + ?Sized,
{
    match store.get_field(parent, FLAG_SCOPE, key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Writes one typed flag into this crate's scope.
pub fn write_flag<T, S>(store: &mut S, parent: &str, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize,
    S: FlagStore + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.set_field(parent, FLAG_SCOPE, key, &value)
}
