// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All reads and writes go through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use chanvault_core::ChanvaultError;
use tracing::debug;

use crate::migrations::run_migrations;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owner of the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ChanvaultError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ChanvaultError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(ChanvaultError::storage)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, ChanvaultError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(ChanvaultError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), ChanvaultError> {
        self.conn
            .call(move |conn| -> Result<(), ChanvaultError> {
                conn.busy_timeout(BUSY_TIMEOUT)
                    .map_err(ChanvaultError::storage)?;
                if wal_mode {
                    let mode: String = conn
                        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                        .map_err(ChanvaultError::storage)?;
                    debug!(mode = %mode, "journal mode set");
                }
                conn.execute_batch("PRAGMA synchronous = NORMAL;")
                    .map_err(ChanvaultError::storage)?;
                run_migrations(conn)
            })
            .await
            .map_err(map_tr_err)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), ChanvaultError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Flatten a tokio-rusqlite error into a storage error.
pub(crate) fn map_tr_err<E: std::fmt::Display>(err: tokio_rusqlite::Error<E>) -> ChanvaultError {
    ChanvaultError::storage(err)
}
