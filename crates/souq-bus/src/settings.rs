// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable storefront settings.

use serde::{Deserialize, Serialize};
use souq_core::Language;
use tokio::sync::watch;
use tracing::info;

use crate::bus::EventBus;
use crate::event::BusEvent;

/// Settings every chat surface renders against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub language: Language,
    pub store_name: String,
}

impl StoreSettings {
    pub fn text_direction(&self) -> &'static str {
        self.language.text_direction()
    }
}

/// Holds the current [`StoreSettings`] and notifies subscribers on change.
///
/// Subscribers get a `watch` receiver that always yields the latest value.
/// Every effective change is also published as [`BusEvent::SettingsChanged`].
/// Setting a value equal to the current one notifies nobody.
pub struct SettingsStore {
    tx: watch::Sender<StoreSettings>,
    bus: EventBus,
}

impl SettingsStore {
    pub fn new(initial: StoreSettings, bus: EventBus) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx, bus }
    }

    /// Snapshot of the current settings.
    pub fn current(&self) -> StoreSettings {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSettings> {
        self.tx.subscribe()
    }

    /// Switch the display language. Returns whether anything changed.
    pub fn set_language(&self, language: Language) -> bool {
        self.update(|s| {
            let changed = s.language != language;
            s.language = language;
            changed
        })
    }

    /// Rename the store. Returns whether anything changed.
    pub fn set_store_name(&self, store_name: impl Into<String>) -> bool {
        let store_name = store_name.into();
        self.update(|s| {
            let changed = s.store_name != store_name;
            s.store_name = store_name;
            changed
        })
    }

    fn update(&self, f: impl FnOnce(&mut StoreSettings) -> bool) -> bool {
        let changed = self.tx.send_if_modified(f);
        if changed {
            let current = self.current();
            info!(language = %current.language, store_name = %current.store_name, "settings changed");
            self.bus.publish(BusEvent::SettingsChanged {
                language: current.language,
                store_name: current.store_name,
            });
        }
        changed
    }
}
