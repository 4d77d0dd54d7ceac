// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw key/value operations on the `local_storage` table.

use rusqlite::{params, OptionalExtension};
use souq_core::SouqError;

use crate::database::{map_tr_err, Database};

pub(crate) const UPSERT_SQL: &str = "INSERT INTO local_storage (key, value, updated_at)
     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// Read the raw value stored under `key`.
pub async fn get_item(db: &Database, key: &str) -> Result<Option<String>, SouqError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Store `value` under `key`, replacing any previous value.
pub async fn set_item(db: &Database, key: &str, value: &str) -> Result<(), SouqError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(UPSERT_SQL, params![key, value])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete `key`. Missing keys are not an error.
pub async fn remove_item(db: &Database, key: &str) -> Result<(), SouqError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
