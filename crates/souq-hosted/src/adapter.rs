// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted implementation of the repository traits.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use souq_config::model::HostedBackendConfig;
use souq_core::{
    AccountRepository, BackendAdapter, ChatRepository, Customer, Direction, HealthStatus,
    LoginAttempt, MediaStore, MediaUpload, Message, Reply, Session, SessionUpdate, SouqError,
};

use crate::client::{eq, Filter, HostedClient};

const CUSTOMERS: &str = "customers";
const SESSIONS: &str = "chat_sessions";
const MESSAGES: &str = "chat_messages";
const LOGIN_ATTEMPTS: &str = "login_attempts";

/// Multi-device backend over the hosted table and storage APIs.
///
/// Both message directions share the `chat_messages` table. Ordering is
/// pushed to the server; ties on `created_at` sort customer messages first,
/// matching the local backend.
///
/// Session updates from this process are serialized through `session_lock`.
/// The table API has no transactions, so writers in other processes can
/// still race.
pub struct HostedStore {
    client: HostedClient,
    session_lock: Mutex<()>,
}

impl HostedStore {
    pub fn new(config: &HostedBackendConfig) -> Result<Self, SouqError> {
        Ok(Self {
            client: HostedClient::new(config)?,
            session_lock: Mutex::new(()),
        })
    }

    async fn first<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        filter: Filter,
    ) -> Result<Option<T>, SouqError> {
        let rows = self
            .client
            .select(table, &[filter, ("limit", "1".to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl BackendAdapter for HostedStore {
    fn name(&self) -> &str {
        "hosted"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, SouqError> {
        let ping = self
            .client
            .select::<serde_json::Value>(
                SESSIONS,
                &[
                    ("select", "customer_id".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await;
        Ok(match ping {
            Ok(_) => HealthStatus::Healthy,
            Err(SouqError::Backend {
                status: Some(status),
                message,
                ..
            }) if status < 500 => HealthStatus::Degraded(message),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), SouqError> {
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for HostedStore {
    async fn insert_message(&self, message: &Message) -> Result<(), SouqError> {
        let _: Vec<Message> = self.client.insert(MESSAGES, message).await?;
        debug!(id = %message.id, customer_id = %message.customer_id, "message inserted");
        Ok(())
    }

    async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, SouqError> {
        self.client
            .select(
                MESSAGES,
                &[
                    eq("customer_id", customer_id),
                    ("order", "created_at.asc,direction.asc".to_string()),
                ],
            )
            .await
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, SouqError> {
        self.first(MESSAGES, eq("id", id)).await
    }

    async fn set_reply(&self, message_id: &str, reply: &Reply) -> Result<(), SouqError> {
        let updated: Vec<Message> = self
            .client
            .update(MESSAGES, &[eq("id", message_id)], &json!({ "reply": reply }))
            .await?;
        if updated.is_empty() {
            return Err(SouqError::not_found("message", message_id));
        }
        Ok(())
    }

    async fn mark_messages_read(&self, customer_id: &str) -> Result<u32, SouqError> {
        let updated: Vec<serde_json::Value> = self
            .client
            .update(
                MESSAGES,
                &[
                    eq("customer_id", customer_id),
                    eq("direction", Direction::Customer),
                    eq("read", false),
                ],
                &json!({ "read": true }),
            )
            .await?;
        Ok(u32::try_from(updated.len()).unwrap_or(u32::MAX))
    }

    async fn delete_messages(&self, customer_id: &str) -> Result<(), SouqError> {
        self.client
            .delete(MESSAGES, &[eq("customer_id", customer_id)])
            .await
    }

    async fn get_session(&self, customer_id: &str) -> Result<Option<Session>, SouqError> {
        self.first(SESSIONS, eq("customer_id", customer_id)).await
    }

    async fn put_session(&self, session: &Session) -> Result<(), SouqError> {
        let _: Vec<Session> = self
            .client
            .upsert(SESSIONS, session, "customer_id")
            .await?;
        Ok(())
    }

    async fn update_session(
        &self,
        customer_id: &str,
        update: SessionUpdate,
    ) -> Result<Session, SouqError> {
        let _guard = self.session_lock.lock().await;
        let current = self.get_session(customer_id).await?;
        let next = update(current)?;
        self.put_session(&next).await?;
        Ok(next)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, SouqError> {
        self.client
            .select(SESSIONS, &[("order", "last_activity.desc".to_string())])
            .await
    }

    async fn delete_session(&self, customer_id: &str) -> Result<(), SouqError> {
        self.client
            .delete(SESSIONS, &[eq("customer_id", customer_id)])
            .await
    }
}

#[async_trait]
impl AccountRepository for HostedStore {
    async fn insert_customer(&self, customer: &Customer) -> Result<(), SouqError> {
        let _: Vec<Customer> = self.client.insert(CUSTOMERS, customer).await?;
        Ok(())
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, SouqError> {
        self.first(CUSTOMERS, eq("id", id)).await
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, SouqError> {
        self.first(CUSTOMERS, eq("email", email.to_lowercase())).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, SouqError> {
        self.client
            .select(CUSTOMERS, &[("order", "created_at.asc".to_string())])
            .await
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), SouqError> {
        let updated: Vec<Customer> = self
            .client
            .update(CUSTOMERS, &[eq("id", &customer.id)], customer)
            .await?;
        if updated.is_empty() {
            return Err(SouqError::not_found("customer", &customer.id));
        }
        Ok(())
    }

    async fn delete_customer(&self, id: &str) -> Result<(), SouqError> {
        self.client.delete(CUSTOMERS, &[eq("id", id)]).await
    }

    async fn record_login_attempt(&self, attempt: &LoginAttempt) -> Result<(), SouqError> {
        let _: Vec<LoginAttempt> = self.client.insert(LOGIN_ATTEMPTS, attempt).await?;
        Ok(())
    }

    async fn list_login_attempts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LoginAttempt>, SouqError> {
        let mut params = vec![("order", "created_at.desc".to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.client.select(LOGIN_ATTEMPTS, &params).await
    }
}

#[async_trait]
impl MediaStore for HostedStore {
    async fn upload(&self, upload: &MediaUpload) -> Result<String, SouqError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let path = format!(
            "{}/{}/{}-{}.{}",
            upload.user_id,
            upload.folder,
            Utc::now().timestamp_millis(),
            &nonce[..8],
            upload.extension()
        );
        self.client
            .upload_object(&path, upload.bytes.clone(), &upload.content_type)
            .await?;
        debug!(path, bytes = upload.bytes.len(), "media uploaded");
        Ok(self.client.public_url(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use souq_core::SessionStatus;
    use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_store(base_url: &str) -> HostedStore {
        HostedStore::new(&HostedBackendConfig {
            base_url: Some(base_url.to_string()),
            api_key: Some("anon-key".into()),
            bucket: "chat-media".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, secs).unwrap()
    }

    fn message_json(id: &str, direction: &str, secs: u32) -> serde_json::Value {
        json!({
            "id": id,
            "customer_id": "c1",
            "body": "مرحبا",
            "attachments": [],
            "direction": direction,
            "read": false,
            "reply": null,
            "created_at": at(secs),
        })
    }

    #[tokio::test]
    async fn list_messages_orders_on_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_messages"))
            .and(query_param("customer_id", "eq.c1"))
            .and(query_param("order", "created_at.asc,direction.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                message_json("m1", "customer", 1),
                message_json("m2", "support", 2),
            ])))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].direction, Direction::Support);
    }

    #[tokio::test]
    async fn set_reply_on_unknown_message_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/chat_messages"))
            .and(query_param("id", "eq.ghost"))
            .and(body_partial_json(json!({"reply": {"body": "hi"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let err = store
            .set_reply(
                "ghost",
                &Reply {
                    body: "hi".into(),
                    replied_at: at(0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SouqError::NotFound { entity: "message", .. }));
    }

    #[tokio::test]
    async fn mark_read_counts_updated_rows() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/chat_messages"))
            .and(query_param("direction", "eq.customer"))
            .and(query_param("read", "eq.false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                message_json("m1", "customer", 1),
                message_json("m3", "customer", 3),
            ])))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        assert_eq!(store.mark_messages_read("c1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn get_session_returns_first_row_or_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_sessions"))
            .and(query_param("customer_id", "eq.c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "customer_id": "c1",
                "status": "closed",
                "last_activity": at(5),
                "unread_count": 2,
                "created_at": at(1),
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_sessions"))
            .and(query_param("customer_id", "eq.c2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let session = store.get_session("c1").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.unread_count, 2);
        assert!(store.get_session("c2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_session_reads_then_upserts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_sessions"))
            .and(query_param("customer_id", "eq.c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "customer_id": "c1",
                "status": "waiting",
                "last_activity": at(5),
                "unread_count": 2,
                "created_at": at(1),
            }])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/chat_sessions"))
            .and(query_param("on_conflict", "customer_id"))
            .and(body_partial_json(json!({"customer_id": "c1", "unread_count": 3})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let session = store
            .update_session(
                "c1",
                Box::new(|current: Option<Session>| -> Result<Session, SouqError> {
                    let mut session = current.ok_or_else(|| SouqError::not_found("session", "c1"))?;
                    session.unread_count += 1;
                    Ok(session)
                }),
            )
            .await
            .unwrap();
        assert_eq!(session.unread_count, 3);
    }

    #[tokio::test]
    async fn failed_session_update_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/chat_sessions"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let err = store
            .update_session(
                "c9",
                Box::new(|current: Option<Session>| -> Result<Session, SouqError> {
                    current.ok_or_else(|| SouqError::not_found("session", "c9"))
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SouqError::NotFound { .. }));
    }

    fn photo_upload() -> MediaUpload {
        MediaUpload {
            user_id: "c1".into(),
            folder: "chat".into(),
            file_name: "photo.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0xff, 0xd8],
        }
    }

    #[tokio::test]
    async fn upload_returns_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/chat-media/c1/chat/\d+-[0-9a-f]{8}\.png$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "k"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let url = store.upload(&photo_upload()).await.unwrap();
        let prefix = format!("{}/storage/v1/object/public/chat-media/c1/chat/", server.uri());
        assert!(url.starts_with(&prefix), "got: {url}");
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn back_to_back_uploads_get_distinct_objects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/chat-media/c1/chat/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "k"})))
            .expect(2)
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        let first = store.upload(&photo_upload()).await.unwrap();
        let second = store.upload(&photo_upload()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn health_check_reports_server_errors_as_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_sessions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = test_store(&server.uri());
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
