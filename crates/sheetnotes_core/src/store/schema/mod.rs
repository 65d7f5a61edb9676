//! SQLite schema registry for the flag store.
//!
//! # Responsibility
//! - Register storage schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied schema version is mirrored to `PRAGMA user_version`.
//! - This version tracks the SQLite layout only; per-parent data versions
//!   live in the `migrate` module.

use crate::store::{StoreError, StoreResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaMigration {
    version: u32,
    sql: &'static str,
}

const SCHEMA_MIGRATIONS: &[SchemaMigration] = &[SchemaMigration {
    version: 1,
    sql: include_str!("0001_flags.sql"),
}];

/// Returns the latest schema version known by this binary.
pub fn latest_schema_version() -> u32 {
    SCHEMA_MIGRATIONS
        .last()
        .map_or(0, |migration| migration.version)
}

/// Applies all pending schema migrations on the provided connection.
pub fn apply_schema_migrations(conn: &mut Connection) -> StoreResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_schema_version();

    if current_version > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in SCHEMA_MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> StoreResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
