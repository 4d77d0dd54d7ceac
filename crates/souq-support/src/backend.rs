// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend selection.
//!
//! One concrete store implements every repository trait; [`Backend`] holds
//! it behind each trait object so callers never see which one is in use.

use std::sync::Arc;

use souq_config::model::{BackendKind, SouqConfig};
use souq_core::{AccountRepository, ChatRepository, HealthStatus, MediaStore, SouqError};
use souq_hosted::HostedStore;
use souq_storage::LocalStore;
use tracing::info;

#[derive(Clone)]
pub struct Backend {
    pub chat: Arc<dyn ChatRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub media: Arc<dyn MediaStore>,
}

impl Backend {
    pub fn from_local(store: Arc<LocalStore>) -> Self {
        Self {
            chat: store.clone(),
            accounts: store.clone(),
            media: store,
        }
    }

    pub fn from_hosted(store: Arc<HostedStore>) -> Self {
        Self {
            chat: store.clone(),
            accounts: store.clone(),
            media: store,
        }
    }

    pub fn name(&self) -> &str {
        self.chat.name()
    }

    pub async fn health_check(&self) -> Result<HealthStatus, SouqError> {
        self.chat.health_check().await
    }

    pub async fn shutdown(&self) -> Result<(), SouqError> {
        self.chat.shutdown().await
    }
}

/// Open the backend selected by `[backend] kind`.
pub async fn open_backend(config: &SouqConfig) -> Result<Backend, SouqError> {
    let backend = match config.backend.kind {
        BackendKind::Local => {
            let store = LocalStore::open(config.backend.local.clone()).await?;
            Backend::from_local(Arc::new(store))
        }
        BackendKind::Hosted => {
            let store = HostedStore::new(&config.backend.hosted)?;
            Backend::from_hosted(Arc::new(store))
        }
    };
    info!(backend = backend.name(), "backend opened");
    Ok(backend)
}
