// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic re-read of chat state.
//!
//! The [`ChatPoller`] re-runs the read path on a fixed interval and replaces
//! its snapshot wholesale. There is no diffing and no backoff. A failed read
//! is logged and the previous snapshot stays in place until the next tick.

use std::time::Duration;

use chrono::{DateTime, Utc};
use souq_bus::{BusEvent, EventBus};
use souq_core::{Message, Session, SouqError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::service::SupportService;

/// What a poller watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollScope {
    /// One customer's conversation and session (storefront widget).
    Customer(String),
    /// Every session (back-office inbox).
    Inbox,
}

impl PollScope {
    fn customer_id(&self) -> Option<String> {
        match self {
            PollScope::Customer(id) => Some(id.clone()),
            PollScope::Inbox => None,
        }
    }
}

/// Latest state read by a poller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub sessions: Vec<Session>,
    /// `None` until the first successful read.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ChatSnapshot {
    pub fn unread(&self) -> u64 {
        self.sessions.iter().map(|s| u64::from(s.unread_count)).sum()
    }
}

pub struct ChatPoller {
    service: SupportService,
    scope: PollScope,
    interval: Duration,
    bus: EventBus,
}

impl ChatPoller {
    pub fn new(service: SupportService, scope: PollScope, interval: Duration, bus: EventBus) -> Self {
        Self {
            service,
            scope,
            interval,
            bus,
        }
    }

    /// Read a fresh snapshot for the configured scope.
    pub async fn refresh(&self) -> Result<ChatSnapshot, SouqError> {
        let (messages, sessions) = match &self.scope {
            PollScope::Customer(customer_id) => {
                let messages = self.service.conversation(customer_id).await?;
                let sessions = self
                    .service
                    .sessions()
                    .get(customer_id)
                    .await?
                    .into_iter()
                    .collect();
                (messages, sessions)
            }
            PollScope::Inbox => (Vec::new(), self.service.list_sessions(None).await?),
        };
        Ok(ChatSnapshot {
            messages,
            sessions,
            refreshed_at: Some(Utc::now()),
        })
    }

    /// Start polling in the background until `cancel` fires.
    ///
    /// The first read happens immediately. The receiver always holds the
    /// most recent successful snapshot.
    pub fn spawn(self, cancel: CancellationToken) -> (watch::Receiver<ChatSnapshot>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(ChatSnapshot::default());
        let handle = tokio::spawn(self.run(tx, cancel));
        (rx, handle)
    }

    async fn run(self, tx: watch::Sender<ChatSnapshot>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(scope = ?self.scope, interval_ms = self.interval.as_millis() as u64, "poller started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.refresh().await {
                        Ok(snapshot) => {
                            let messages = snapshot.messages.len();
                            let sessions = snapshot.sessions.len();
                            tx.send_replace(snapshot);
                            debug!(messages, sessions, "snapshot refreshed");
                            self.bus.publish(BusEvent::SnapshotRefreshed {
                                customer_id: self.scope.customer_id(),
                                messages,
                                sessions,
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "snapshot refresh failed, keeping previous snapshot");
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("poller stopped");
                    break;
                }
            }
        }
    }
}
