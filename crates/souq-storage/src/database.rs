// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! `Database` is the single writer; query modules accept `&Database` and go
//! through [`Database::connection`]. Do not open extra connections for writes.

use std::path::Path;

use souq_core::SouqError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `SouqError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SouqError {
    SouqError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the local SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run migrations.
    ///
    /// `:memory:` opens a private in-memory database.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, SouqError> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| SouqError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| SouqError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA busy_timeout = 5000; PRAGMA synchronous = NORMAL;")?;
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| SouqError::Storage {
                source: Box::new(e),
            })?;

        debug!(path, wal_mode, "local database opened");
        Ok(Self { conn })
    }

    /// Returns the tokio-rusqlite connection used for all queries.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), SouqError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Close the connection, flushing the background thread.
    pub async fn close(self) -> Result<(), SouqError> {
        self.conn.close().await.map_err(|e| SouqError::Storage {
            source: Box::new(e),
        })
    }
}
