// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` connection setup.
//!
//! Opening a store means: connect, apply connection pragmas, then bring the
//! schema up to date with the embedded migrations. Raw SQL is confined to
//! this module; everything else goes through the Diesel DSL.

use diesel::dsl::sql;
use diesel::sql_types::BigInt;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits on a locked file database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Where a connection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// A shared-cache in-memory database.
    InMemory,
    /// A database file on disk, switched to write-ahead logging.
    File,
}

/// Row ID assigned by the most recent insert on this connection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

fn execute_pragma(conn: &mut SqliteConnection, pragma: &str) -> Result<(), PersistenceError> {
    diesel::sql_query(format!("PRAGMA {pragma}"))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("PRAGMA {pragma}: {e}")))?;
    Ok(())
}

fn run_migrations(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    for version in &applied {
        debug!(migration = %version, "Applied migration");
    }
    info!(applied = applied.len(), "Database schema is up to date");
    Ok(())
}

/// Opens a connection, configures it and migrates the schema.
///
/// # Arguments
///
/// * `database_url` - A file path or an `SQLite` URI
/// * `mode` - Whether the database lives in memory or on disk
///
/// # Errors
///
/// Returns an error if the connection, a pragma or a migration fails.
pub fn open_connection(
    database_url: &str,
    mode: StorageMode,
) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, ?mode, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)?;

    execute_pragma(&mut conn, &format!("busy_timeout = {BUSY_TIMEOUT_MS}"))?;
    if mode == StorageMode::File {
        execute_pragma(&mut conn, "journal_mode = WAL")?;
    }

    run_migrations(&mut conn)?;
    Ok(conn)
}
