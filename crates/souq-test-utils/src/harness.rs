// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service stack over a temp-dir local
//! backend. Each harness owns its own database, so tests are independent.

use std::sync::Arc;
use std::time::Duration;

use souq_bus::{EventBus, SettingsStore, StoreSettings};
use souq_config::model::{AccountsConfig, LocalBackendConfig, SouqConfig};
use souq_core::{Customer, MediaStore, SouqError};
use souq_storage::LocalStore;
use souq_support::{AccountService, Backend, ChatPoller, PollScope, SupportService};

use crate::mock_media::MockMediaStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    reopen_on_customer_message: bool,
    max_upload_bytes: Option<usize>,
    mock_media: bool,
    login_attempt_cap: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            reopen_on_customer_message: false,
            max_upload_bytes: None,
            mock_media: false,
            login_attempt_cap: 100,
        }
    }

    /// Reopen closed sessions when the customer writes again.
    pub fn with_reopen_on_customer_message(mut self) -> Self {
        self.reopen_on_customer_message = true;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Route uploads to a [`MockMediaStore`] instead of inline data URLs.
    pub fn with_mock_media(mut self) -> Self {
        self.mock_media = true;
        self
    }

    pub fn with_login_attempt_cap(mut self, cap: usize) -> Self {
        self.login_attempt_cap = cap;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, SouqError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SouqError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = SouqConfig::default();
        config.backend.local = LocalBackendConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
            login_attempt_cap: self.login_attempt_cap,
        };
        config.chat.reopen_on_customer_message = self.reopen_on_customer_message;
        if let Some(bytes) = self.max_upload_bytes {
            config.media.max_upload_bytes = bytes;
        }
        // Cheap hashing keeps the suite fast.
        config.accounts = AccountsConfig {
            kdf_memory_cost: 1024,
            kdf_iterations: 1,
            ..AccountsConfig::default()
        };

        let store = Arc::new(LocalStore::open(config.backend.local.clone()).await?);
        let mut backend = Backend::from_local(store.clone());
        let media = if self.mock_media {
            let media = Arc::new(MockMediaStore::new());
            backend.media = media.clone() as Arc<dyn MediaStore>;
            Some(media)
        } else {
            None
        };

        let bus = EventBus::default();
        let settings = SettingsStore::new(
            StoreSettings {
                language: config.app.language,
                store_name: config.app.store_name.clone(),
            },
            bus.clone(),
        );
        let support = SupportService::new(
            &backend,
            config.media.clone(),
            config.chat.reopen_on_customer_message,
            bus.clone(),
        );
        let accounts = AccountService::new(
            backend.accounts.clone(),
            backend.chat.clone(),
            config.accounts.clone(),
            bus.clone(),
        );

        Ok(TestHarness {
            config,
            store,
            backend,
            bus,
            settings,
            support,
            accounts,
            media,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired service stack over a throwaway local database.
pub struct TestHarness {
    pub config: SouqConfig,
    pub store: Arc<LocalStore>,
    pub backend: Backend,
    pub bus: EventBus,
    pub settings: SettingsStore,
    pub support: SupportService,
    pub accounts: AccountService,
    /// Present when built with [`TestHarnessBuilder::with_mock_media`].
    pub media: Option<Arc<MockMediaStore>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Register a customer with a fixed credential.
    pub async fn register(&self, email: &str) -> Result<Customer, SouqError> {
        self.accounts.register(email, "secret-123").await
    }

    /// A poller with a short interval for tests.
    pub fn poller(&self, scope: PollScope) -> ChatPoller {
        ChatPoller::new(
            self.support.clone(),
            scope,
            Duration::from_millis(50),
            self.bus.clone(),
        )
    }

    /// Path of the harness database.
    pub fn database_path(&self) -> &str {
        &self.config.backend.local.database_path
    }
}
