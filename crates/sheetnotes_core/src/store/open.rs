//! Flag-store bootstrap for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by store behavior.
//! - Run schema migrations before handing out a usable store.
//!
//! # Invariants
//! - Returned stores have `foreign_keys=ON` and a busy timeout set.
//! - Returned stores have schema migrations fully applied.

use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::store::schema::apply_schema_migrations;
use crate::store::{SqliteFlagStore, StoreResult};

/// Opens a flag-store database file and applies pending schema migrations.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> StoreResult<SqliteFlagStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode=file");
    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=file duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(conn, started_at, "file")
}

/// Opens an in-memory flag store and applies pending schema migrations.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store_in_memory() -> StoreResult<SqliteFlagStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode=memory");
    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=memory duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(conn, started_at, "memory")
}

fn finish_open(
    mut conn: Connection,
    started_at: Instant,
    mode: &str,
) -> StoreResult<SqliteFlagStore> {
    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=store status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(SqliteFlagStore::new(conn))
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error_code=store_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema_migrations(conn)?;
    Ok(())
}
