// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat persistence: messages and the per-customer session index.

use async_trait::async_trait;

use crate::error::SouqError;
use crate::traits::adapter::BackendAdapter;
use crate::types::{Message, Reply, Session};

/// Computes a customer's next session from the stored one (`None` if absent).
///
/// Returning an error abandons the update; nothing is written.
pub type SessionUpdate = Box<dyn FnOnce(Option<Session>) -> Result<Session, SouqError> + Send>;

/// Persistence for chat messages and sessions.
///
/// Implementations only store and load rows. Session bookkeeping, caption
/// filling, and lifecycle checks live in the support service so both
/// backends behave identically.
#[async_trait]
pub trait ChatRepository: BackendAdapter {
    /// Persists a new message.
    async fn insert_message(&self, message: &Message) -> Result<(), SouqError>;

    /// Returns a customer's messages of both directions, oldest first.
    async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, SouqError>;

    /// Looks up a single message by ID.
    async fn get_message(&self, id: &str) -> Result<Option<Message>, SouqError>;

    /// Stores an inline support reply on an existing message.
    async fn set_reply(&self, message_id: &str, reply: &Reply) -> Result<(), SouqError>;

    /// Flags every unread customer-authored message of the customer as read.
    ///
    /// Returns the number of messages that changed.
    async fn mark_messages_read(&self, customer_id: &str) -> Result<u32, SouqError>;

    /// Removes all messages belonging to a customer.
    async fn delete_messages(&self, customer_id: &str) -> Result<(), SouqError>;

    /// Returns the session for a customer, if one exists.
    async fn get_session(&self, customer_id: &str) -> Result<Option<Session>, SouqError>;

    /// Inserts or replaces the session keyed by its customer ID.
    async fn put_session(&self, session: &Session) -> Result<(), SouqError>;

    /// Reads, updates, and stores a customer's session as one step.
    ///
    /// Concurrent updates of the same session never interleave, so none of
    /// them is lost. Returns the stored session.
    async fn update_session(
        &self,
        customer_id: &str,
        update: SessionUpdate,
    ) -> Result<Session, SouqError>;

    /// Returns every session, most recent activity first.
    async fn list_sessions(&self) -> Result<Vec<Session>, SouqError>;

    /// Removes a customer's session.
    async fn delete_session(&self, customer_id: &str) -> Result<(), SouqError>;
}
