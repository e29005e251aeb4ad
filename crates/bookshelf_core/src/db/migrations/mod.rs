//! Schema migrations for the catalogue database.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - `PRAGMA user_version` equals the last applied step.
//! - A database written by a newer binary is refused, never downgraded.
//! - All pending steps run inside one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

/// One schema step: version, label used in logs, SQL batch.
type Step = (u32, &'static str, &'static str);

const STEPS: &[Step] = &[(1, "init", include_str!("0001_init.sql"))];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file is newer than this
///   build.
/// - Any SQLite failure; the transaction is rolled back and `user_version`
///   is left untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let target = latest_version();

    if found > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: target,
        });
    }
    if found == target {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending(found) {
        run_step(&tx, step)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={target}");
    Ok(())
}

fn pending(after: u32) -> impl Iterator<Item = &'static Step> {
    STEPS.iter().filter(move |(version, _, _)| *version > after)
}

fn run_step(tx: &Transaction<'_>, &(version, name, sql): &Step) -> DbResult<()> {
    info!("event=db_migrate module=db status=start version={version} step={name}");
    tx.execute_batch(sql)?;
    tx.pragma_update(None, "user_version", version)?;
    Ok(())
}
