// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed JSON collections stored under a single key.
//!
//! A value that fails to parse is treated as an empty collection and logged;
//! the next write under that key replaces it.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use souq_core::SouqError;
use tracing::warn;

use crate::database::{map_tr_err, Database};
use crate::queries::kv;

fn parse_list<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "malformed collection, treating as empty");
        Vec::new()
    })
}

/// Load the collection stored under `key`.
pub async fn load_list<T: DeserializeOwned>(db: &Database, key: &str) -> Result<Vec<T>, SouqError> {
    let raw = kv::get_item(db, key).await?;
    Ok(parse_list(key, raw))
}

/// Read-modify-write the collection under `key` inside one transaction.
///
/// `f` receives the current items and its return value is passed back. The
/// collection is written back even if `f` leaves it unchanged.
pub async fn update_list<T, R, F>(db: &Database, key: &str, f: F) -> Result<R, SouqError>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    R: Send + 'static,
    F: FnOnce(&mut Vec<T>) -> R + Send + 'static,
{
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<R, rusqlite::Error> {
            let tx = conn.transaction()?;
            let raw: Option<String> = tx
                .query_row(
                    "SELECT value FROM local_storage WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            let mut items = parse_list(&key, raw);
            let out = f(&mut items);
            let json = serde_json::to_string(&items)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            tx.execute(kv::UPSERT_SQL, params![key, json])?;
            tx.commit()?;
            Ok(out)
        })
        .await
        .map_err(map_tr_err)
}

/// Load a single JSON value (flag, timestamp) stored under `key`.
///
/// Unparseable values read as `None`.
pub async fn load_value<T: DeserializeOwned>(
    db: &Database,
    key: &str,
) -> Result<Option<T>, SouqError> {
    let raw = kv::get_item(db, key).await?;
    Ok(raw.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "malformed value, ignoring");
            None
        }
    }))
}

/// Store a single JSON value under `key`.
pub async fn store_value<T: Serialize>(db: &Database, key: &str, value: &T) -> Result<(), SouqError> {
    let json = serde_json::to_string(value).map_err(SouqError::serialization)?;
    kv::set_item(db, key, &json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        n: u32,
    }

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("collections.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn missing_collection_loads_empty() {
        let (db, _dir) = setup_db().await;
        let items: Vec<Item> = load_list(&db, "items").await.unwrap();
        assert!(items.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_list_persists_changes_and_returns_result() {
        let (db, _dir) = setup_db().await;
        let len = update_list(&db, "items", |items: &mut Vec<Item>| {
            items.push(Item { n: 1 });
            items.push(Item { n: 2 });
            items.len()
        })
        .await
        .unwrap();
        assert_eq!(len, 2);

        let items: Vec<Item> = load_list(&db, "items").await.unwrap();
        assert_eq!(items, vec![Item { n: 1 }, Item { n: 2 }]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_collection_falls_back_to_empty() {
        let (db, _dir) = setup_db().await;
        kv::set_item(&db, "items", "{not json").await.unwrap();

        let items: Vec<Item> = load_list(&db, "items").await.unwrap();
        assert!(items.is_empty());

        // The next write replaces the corrupted blob.
        update_list(&db, "items", |items: &mut Vec<Item>| items.push(Item { n: 7 }))
            .await
            .unwrap();
        let raw = kv::get_item(&db, "items").await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"n":7}]"#);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn scalar_values_round_trip() {
        let (db, _dir) = setup_db().await;
        store_value(&db, "customer_online_c1", &true).await.unwrap();
        let online: Option<bool> = load_value(&db, "customer_online_c1").await.unwrap();
        assert_eq!(online, Some(true));

        kv::set_item(&db, "customer_online_c2", "yes").await.unwrap();
        let bad: Option<bool> = load_value(&db, "customer_online_c2").await.unwrap();
        assert_eq!(bad, None);
        db.close().await.unwrap();
    }
}
