// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event types carried on the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{Direction, Language, SessionStatus};

/// Something that happened in the chat core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusEvent {
    /// A message was persisted.
    MessageAppended {
        customer_id: String,
        message_id: String,
        direction: Direction,
    },
    /// A session's status or unread counter changed.
    SessionChanged {
        customer_id: String,
        status: SessionStatus,
        unread_count: u32,
    },
    /// Storefront settings were updated.
    SettingsChanged {
        language: Language,
        store_name: String,
    },
    /// A poller replaced its snapshot.
    SnapshotRefreshed {
        customer_id: Option<String>,
        messages: usize,
        sessions: usize,
    },
    /// A customer was blocked or unblocked.
    CustomerBlocked { customer_id: String, blocked: bool },
}

impl BusEvent {
    /// Short machine name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            BusEvent::MessageAppended { .. } => "message_appended",
            BusEvent::SessionChanged { .. } => "session_changed",
            BusEvent::SettingsChanged { .. } => "settings_changed",
            BusEvent::SnapshotRefreshed { .. } => "snapshot_refreshed",
            BusEvent::CustomerBlocked { .. } => "customer_blocked",
        }
    }
}

/// A [`BusEvent`] stamped with an id and publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: String,
    pub at: DateTime<Utc>,
    pub event: BusEvent,
}

impl EventEnvelope {
    pub fn new(event: BusEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            at: Utc::now(),
            event,
        }
    }
}
