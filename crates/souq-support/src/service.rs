// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat operations as the storefront and back-office see them.
//!
//! [`SupportService`] ties the message store and session index together,
//! applies the caption rule and the blocked-customer check, and publishes
//! bus events for every change.

use std::sync::Arc;

use souq_bus::{BusEvent, EventBus};
use souq_config::model::MediaConfig;
use souq_core::{
    AccountRepository, Attachment, Customer, Direction, MediaStore, MediaUpload, Message, Session,
    SessionStatus, SouqError,
};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::caption::resolve_body;
use crate::messages::MessageStore;
use crate::sessions::SessionIndex;

/// Result of sending a message: the stored message and the updated session.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: Message,
    pub session: Session,
}

#[derive(Clone)]
pub struct SupportService {
    messages: MessageStore,
    sessions: SessionIndex,
    accounts: Arc<dyn AccountRepository>,
    media: Arc<dyn MediaStore>,
    media_config: MediaConfig,
    bus: EventBus,
}

impl SupportService {
    pub fn new(
        backend: &Backend,
        media_config: MediaConfig,
        reopen_on_customer_message: bool,
        bus: EventBus,
    ) -> Self {
        Self {
            messages: MessageStore::new(backend.chat.clone()),
            sessions: SessionIndex::new(backend.chat.clone(), reopen_on_customer_message),
            accounts: backend.accounts.clone(),
            media: backend.media.clone(),
            media_config,
            bus,
        }
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn sessions(&self) -> &SessionIndex {
        &self.sessions
    }

    fn publish_session(&self, session: &Session) {
        self.bus.publish(BusEvent::SessionChanged {
            customer_id: session.customer_id.clone(),
            status: session.status,
            unread_count: session.unread_count,
        });
    }

    async fn require_customer(&self, customer_id: &str) -> Result<Customer, SouqError> {
        self.accounts
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| SouqError::not_found("customer", customer_id))
    }

    async fn deliver(
        &self,
        customer_id: &str,
        text: &str,
        attachments: Vec<Attachment>,
        direction: Direction,
    ) -> Result<Delivery, SouqError> {
        let body = resolve_body(text, &attachments)?;
        let message = self
            .messages
            .append(customer_id, &body, attachments, direction)
            .await?;
        self.bus.publish(BusEvent::MessageAppended {
            customer_id: customer_id.to_string(),
            message_id: message.id.clone(),
            direction,
        });
        let session = self.sessions.upsert_on_message(customer_id, direction).await?;
        self.publish_session(&session);
        Ok(Delivery { message, session })
    }

    /// Send a message as the customer.
    ///
    /// Blank text with attachments is replaced by the auto-caption. Blocked
    /// and unknown customers are refused before anything is written.
    pub async fn send_customer_message(
        &self,
        customer_id: &str,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> Result<Delivery, SouqError> {
        let customer = self.require_customer(customer_id).await?;
        if customer.blocked {
            return Err(SouqError::Auth(format!("customer {customer_id} is blocked")));
        }
        self.deliver(customer_id, text, attachments, Direction::Customer)
            .await
    }

    /// Send a separate support message into the customer's conversation.
    ///
    /// The customer must exist; blocked customers can still be written to.
    pub async fn send_support_message(
        &self,
        customer_id: &str,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> Result<Delivery, SouqError> {
        self.require_customer(customer_id).await?;
        self.deliver(customer_id, text, attachments, Direction::Support)
            .await
    }

    /// Answer a customer message inline; counts as support activity.
    pub async fn reply_inline(&self, message_id: &str, body: &str) -> Result<Delivery, SouqError> {
        let message = self.messages.attach_reply(message_id, body).await?;
        let session = self
            .sessions
            .upsert_on_message(&message.customer_id, Direction::Support)
            .await?;
        info!(message_id, customer_id = %message.customer_id, "inline reply attached");
        self.publish_session(&session);
        Ok(Delivery { message, session })
    }

    /// Store a file and return an attachment pointing at it.
    pub async fn upload_attachment(
        &self,
        customer_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment, SouqError> {
        if bytes.is_empty() {
            return Err(SouqError::Validation(format!("{file_name} is empty")));
        }
        if bytes.len() > self.media_config.max_upload_bytes {
            return Err(SouqError::Validation(format!(
                "{file_name} is {} bytes, limit is {}",
                bytes.len(),
                self.media_config.max_upload_bytes
            )));
        }
        let upload = MediaUpload {
            user_id: customer_id.to_string(),
            folder: self.media_config.folder.clone(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        };
        let url = self.media.upload(&upload).await?;
        debug!(customer_id, file_name, kind = %upload.kind(), "attachment stored");
        Ok(Attachment::new(upload.kind(), url).with_name(file_name))
    }

    pub async fn conversation(&self, customer_id: &str) -> Result<Vec<Message>, SouqError> {
        self.messages.list_by_customer(customer_id).await
    }

    pub async fn list_sessions(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Session>, SouqError> {
        self.sessions.list(status).await
    }

    pub async fn total_unread(&self) -> Result<u64, SouqError> {
        self.sessions.total_unread().await
    }

    pub async fn mark_read(&self, customer_id: &str) -> Result<Session, SouqError> {
        let session = self.sessions.mark_read(customer_id).await?;
        self.publish_session(&session);
        Ok(session)
    }

    pub async fn close(&self, customer_id: &str) -> Result<Session, SouqError> {
        let session = self.sessions.close(customer_id).await?;
        self.publish_session(&session);
        Ok(session)
    }

    pub async fn reopen(&self, customer_id: &str) -> Result<Session, SouqError> {
        let session = self.sessions.reopen(customer_id).await?;
        self.publish_session(&session);
        Ok(session)
    }

    pub async fn repair(&self, customer_id: &str) -> Result<Session, SouqError> {
        let session = self.sessions.repair_session(customer_id).await?;
        self.publish_session(&session);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::local_repo;
    use chrono::Utc;
    use souq_core::AttachmentKind;

    async fn setup() -> (SupportService, Backend, EventBus, tempfile::TempDir) {
        let (repo, dir) = local_repo().await;
        let backend = Backend::from_local(repo);
        let bus = EventBus::default();
        let service = SupportService::new(
            &backend,
            MediaConfig {
                max_upload_bytes: 8,
                folder: "chat".into(),
            },
            false,
            bus.clone(),
        );
        (service, backend, bus, dir)
    }

    async fn add_customer(backend: &Backend, id: &str, blocked: bool) {
        backend
            .accounts
            .insert_customer(&Customer {
                id: id.into(),
                email: format!("{id}@example.com"),
                credential_hash: "$argon2id$stub".into(),
                verified: true,
                blocked,
                online: true,
                last_seen: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn two_images_without_text_get_caption() {
        let (service, backend, _bus, _dir) = setup().await;
        add_customer(&backend, "c1", false).await;

        let images = vec![
            Attachment::new(AttachmentKind::Image, "data:image/png;base64,AA=="),
            Attachment::new(AttachmentKind::Image, "data:image/png;base64,AQ=="),
        ];
        let delivery = service.send_customer_message("c1", "", images).await.unwrap();
        assert_eq!(delivery.message.body, "تم إرسال 2 صور");
        assert_eq!(delivery.session.status, SessionStatus::Waiting);
        assert_eq!(delivery.session.unread_count, 1);
    }

    #[tokio::test]
    async fn blocked_or_unknown_customers_cannot_send() {
        let (service, backend, _bus, _dir) = setup().await;
        add_customer(&backend, "blocked", true).await;

        assert!(matches!(
            service.send_customer_message("blocked", "hi", vec![]).await.unwrap_err(),
            SouqError::Auth(_)
        ));
        assert!(matches!(
            service.send_customer_message("ghost", "hi", vec![]).await.unwrap_err(),
            SouqError::NotFound { .. }
        ));
        assert!(service.conversation("blocked").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn support_cannot_write_to_unknown_customer() {
        let (service, _backend, _bus, _dir) = setup().await;

        assert!(matches!(
            service.send_support_message("ghost", "hello", vec![]).await.unwrap_err(),
            SouqError::NotFound { entity: "customer", .. }
        ));
        assert!(service.conversation("ghost").await.unwrap().is_empty());
        assert!(service.list_sessions(None).await.unwrap().is_empty());
        assert_eq!(service.total_unread().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_writing() {
        let (service, backend, _bus, _dir) = setup().await;
        add_customer(&backend, "c1", false).await;
        assert!(matches!(
            service.send_customer_message("c1", "   ", vec![]).await.unwrap_err(),
            SouqError::Validation(_)
        ));
        assert!(service.sessions().get("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn support_reply_activates_and_publishes() {
        let (service, backend, bus, _dir) = setup().await;
        add_customer(&backend, "c1", false).await;
        let mut events = bus.subscribe();

        service.send_customer_message("c1", "hello", vec![]).await.unwrap();
        let reply = service.send_support_message("c1", "أهلاً", vec![]).await.unwrap();
        assert_eq!(reply.session.status, SessionStatus::Active);
        assert_eq!(reply.session.unread_count, 1);

        let mut kinds = Vec::new();
        while let Ok(envelope) = events.try_recv() {
            kinds.push(envelope.event.kind());
        }
        assert_eq!(
            kinds,
            vec!["message_appended", "session_changed", "message_appended", "session_changed"]
        );
    }

    #[tokio::test]
    async fn inline_reply_attaches_to_customer_message() {
        let (service, backend, _bus, _dir) = setup().await;
        add_customer(&backend, "c1", false).await;
        let sent = service.send_customer_message("c1", "price?", vec![]).await.unwrap();

        let delivery = service.reply_inline(&sent.message.id, "99 SAR").await.unwrap();
        assert_eq!(delivery.message.reply.unwrap().body, "99 SAR");
        assert_eq!(delivery.session.status, SessionStatus::Active);
        assert_eq!(service.conversation("c1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn close_then_customer_message_stays_closed() {
        let (service, backend, _bus, _dir) = setup().await;
        add_customer(&backend, "c1", false).await;
        service.send_customer_message("c1", "hi", vec![]).await.unwrap();
        service.close("c1").await.unwrap();

        let after = service.send_customer_message("c1", "still there?", vec![]).await.unwrap();
        assert_eq!(after.session.status, SessionStatus::Closed);

        let read = service.mark_read("c1").await.unwrap();
        assert_eq!(read.unread_count, 0);
        assert_eq!(service.total_unread().await.unwrap(), 0);
        assert_eq!(service.reopen("c1").await.unwrap().status, SessionStatus::Waiting);
    }

    #[tokio::test]
    async fn upload_enforces_size_limit() {
        let (service, _backend, _bus, _dir) = setup().await;
        let attachment = service
            .upload_attachment("c1", "a.png", "image/png", b"png".to_vec())
            .await
            .unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Image);
        assert_eq!(attachment.name.as_deref(), Some("a.png"));
        assert!(attachment.url.starts_with("data:image/png;base64,"));

        let err = service
            .upload_attachment("c1", "big.mp4", "video/mp4", vec![0; 9])
            .await
            .unwrap_err();
        assert!(matches!(err, SouqError::Validation(_)));
        assert!(service
            .upload_attachment("c1", "empty.txt", "text/plain", Vec::new())
            .await
            .is_err());
    }
}
