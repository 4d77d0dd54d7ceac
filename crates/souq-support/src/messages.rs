// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store over a [`ChatRepository`].

use std::sync::Arc;

use chrono::Utc;
use souq_core::{Attachment, ChatRepository, Direction, Message, Reply, SouqError};
use tracing::debug;

/// Appends and lists chat messages.
///
/// No pagination, deduplication, or delivery confirmation: every call is a
/// single repository round trip.
#[derive(Clone)]
pub struct MessageStore {
    repo: Arc<dyn ChatRepository>,
}

impl MessageStore {
    pub fn new(repo: Arc<dyn ChatRepository>) -> Self {
        Self { repo }
    }

    /// Persist a new message and return it.
    ///
    /// `body` is stored as given; caption substitution happens upstream.
    pub async fn append(
        &self,
        customer_id: &str,
        body: &str,
        attachments: Vec<Attachment>,
        direction: Direction,
    ) -> Result<Message, SouqError> {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            body: body.to_string(),
            attachments,
            direction,
            read: false,
            reply: None,
            created_at: Utc::now(),
        };
        self.repo.insert_message(&message).await?;
        debug!(
            id = %message.id,
            customer_id,
            %direction,
            attachments = message.attachments.len(),
            "message appended"
        );
        Ok(message)
    }

    /// All messages for `customer_id`, oldest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Message>, SouqError> {
        self.repo.list_messages(customer_id).await
    }

    /// Attach an inline support reply to `message_id` and return the updated message.
    pub async fn attach_reply(&self, message_id: &str, body: &str) -> Result<Message, SouqError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(SouqError::Validation("reply text is empty".into()));
        }
        let reply = Reply {
            body: body.to_string(),
            replied_at: Utc::now(),
        };
        self.repo.set_reply(message_id, &reply).await?;
        self.repo
            .get_message(message_id)
            .await?
            .ok_or_else(|| SouqError::not_found("message", message_id))
    }

    /// Flag every customer-authored message of `customer_id` as read.
    pub async fn mark_messages_read(&self, customer_id: &str) -> Result<u32, SouqError> {
        self.repo.mark_messages_read(customer_id).await
    }

    pub async fn delete_customer_messages(&self, customer_id: &str) -> Result<(), SouqError> {
        self.repo.delete_messages(customer_id).await
    }
}
