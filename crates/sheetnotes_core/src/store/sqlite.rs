//! SQLite-backed flag store.
//!
//! # Responsibility
//! - Persist one JSON value per (parent, scope, key) triple.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - `set_field` replaces the stored value wholesale (upsert).
//! - Stored values are always valid JSON text.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::store::{FlagStore, StoreResult};

/// Flag store persisting into a migrated SQLite connection.
#[derive(Debug)]
pub struct SqliteFlagStore {
    conn: Connection,
}

impl SqliteFlagStore {
    /// Wraps a connection whose schema migrations have already run.
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrows the underlying connection, mainly for test assertions.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl FlagStore for SqliteFlagStore {
    fn get_field(&self, parent: &str, scope: &str, key: &str) -> StoreResult<Option<Value>> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM flags
                 WHERE parent_id = ?1 AND scope = ?2 AND key = ?3;",
                params![parent, scope, key],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set_field(
        &mut self,
        parent: &str,
        scope: &str,
        key: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO flags (parent_id, scope, key, value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (parent_id, scope, key)
             DO UPDATE SET value = excluded.value;",
            params![parent, scope, key, text],
        )?;
        Ok(())
    }
}
