// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast fan-out of [`BusEvent`]s.

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::event::{BusEvent, EventEnvelope};

/// Default number of events buffered per subscriber before lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// Multi-producer, multi-consumer event bus.
///
/// Publishing never blocks and never fails: with no subscribers the event
/// is dropped. Slow subscribers observe `RecvError::Lagged` and skip ahead.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish `event`; returns how many subscribers received it.
    pub fn publish(&self, event: BusEvent) -> usize {
        let kind = event.kind();
        match self.tx.send(EventEnvelope::new(event)) {
            Ok(receivers) => {
                debug!(kind, receivers, "event published");
                receivers
            }
            Err(_) => {
                trace!(kind, "event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
