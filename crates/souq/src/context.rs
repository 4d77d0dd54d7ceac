// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of config, backend, bus, and services for one CLI invocation.

use souq_bus::{EventBus, SettingsStore, StoreSettings};
use souq_config::model::SouqConfig;
use souq_core::SouqError;
use souq_support::{AccountService, Backend, SupportService};
use tracing::debug;

pub struct AppContext {
    pub config: SouqConfig,
    pub backend: Backend,
    pub bus: EventBus,
    pub settings: SettingsStore,
    pub support: SupportService,
    pub accounts: AccountService,
}

impl AppContext {
    pub async fn open(config: SouqConfig) -> Result<Self, SouqError> {
        let backend = souq_support::open_backend(&config).await?;
        let bus = EventBus::default();
        let settings = settings_store(&config, bus.clone());
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
        debug!(backend = backend.name(), "application context ready");
        Ok(Self {
            config,
            backend,
            bus,
            settings,
            support,
            accounts,
        })
    }

    pub async fn close(self) -> Result<(), SouqError> {
        self.backend.shutdown().await
    }
}

/// Settings store seeded from `[app]`.
pub fn settings_store(config: &SouqConfig, bus: EventBus) -> SettingsStore {
    SettingsStore::new(
        StoreSettings {
            language: config.app.language,
            store_name: config.app.store_name.clone(),
        },
        bus,
    )
}
