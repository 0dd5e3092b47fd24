// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management.
//!
//! All statements run on tokio-rusqlite's single background thread, so a
//! [`Database`] is cheap to share behind an `Arc`.

use nudge_core::NudgeError;
use rusqlite::OpenFlags;
use tracing::debug;

use crate::migrations;

/// Handle to the chat database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    read_only: bool,
}

impl Database {
    /// Open read-write, creating the file and schema if needed.
    pub async fn open(path: &str) -> Result<Self, NudgeError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| NudgeError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(migrations::map_migration_err)?;

        debug!(path, "chat database opened read-write");
        Ok(Self {
            conn,
            read_only: false,
        })
    }

    /// Open an existing database without write access.
    ///
    /// The chat application may be writing concurrently; a busy timeout keeps
    /// reads from failing on a momentary lock.
    pub async fn open_read_only(path: &str) -> Result<Self, NudgeError> {
        let conn = tokio_rusqlite::Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .await
        .map_err(|e| NudgeError::Storage {
            source: Box::new(e),
        })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "chat database opened read-only");
        Ok(Self {
            conn,
            read_only: true,
        })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Checkpoint the WAL on read-write handles. Read-only handles have nothing to flush.
    pub async fn close(&self) -> Result<(), NudgeError> {
        if self.read_only {
            return Ok(());
        }
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into a lookup failure.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> NudgeError {
    NudgeError::Lookup {
        message: format!("chat database error: {e}"),
        source: Some(Box::new(e)),
    }
}
