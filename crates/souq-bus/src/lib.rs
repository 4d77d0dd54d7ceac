// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process event bus and observable settings for the Souq support chat.
//!
//! Components never reach for globals: the [`EventBus`] and [`SettingsStore`]
//! are constructed once and handed to whoever needs them.

pub mod bus;
pub mod event;
pub mod settings;

pub use bus::EventBus;
pub use event::{BusEvent, EventEnvelope};
pub use settings::{SettingsStore, StoreSettings};
