// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for unit tests.

use std::sync::Arc;

use souq_config::model::LocalBackendConfig;
use souq_storage::LocalStore;
use tempfile::TempDir;

pub(crate) async fn local_repo() -> (Arc<LocalStore>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("support.db");
    let store = LocalStore::open(LocalBackendConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
        login_attempt_cap: 100,
    })
    .await
    .unwrap();
    (Arc::new(store), dir)
}
