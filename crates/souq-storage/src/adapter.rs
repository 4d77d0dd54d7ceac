// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local key/value implementation of the repository traits.

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::debug;

use souq_config::model::LocalBackendConfig;
use souq_core::{
    AccountRepository, BackendAdapter, ChatRepository, Customer, Direction, HealthStatus,
    LoginAttempt, MediaStore, MediaUpload, Message, Reply, Session, SessionUpdate, SouqError,
};

use crate::database::{map_tr_err, Database};
use crate::keys;
use crate::queries::collections::{load_list, load_value, store_value, update_list};
use crate::queries::kv;

/// Single-device backend storing every collection as a JSON blob.
///
/// Customer messages and support messages live under separate keys and are
/// merged on read. Presence flags (`online`, `blocked`, `last_seen`) are kept
/// under their own per-customer keys and take precedence over the copies in
/// the customer list.
pub struct LocalStore {
    config: LocalBackendConfig,
    db: Database,
}

impl LocalStore {
    /// Open the database at the configured path and run migrations.
    pub async fn open(config: LocalBackendConfig) -> Result<Self, SouqError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "local store opened");
        Ok(Self { config, db })
    }

    fn message_key(direction: Direction) -> &'static str {
        match direction {
            Direction::Customer => keys::CUSTOMER_MESSAGES,
            Direction::Support => keys::SUPPORT_MESSAGES,
        }
    }

    /// Apply the per-customer flag keys on top of the stored record.
    async fn with_flags(&self, mut customer: Customer) -> Result<Customer, SouqError> {
        if let Some(online) = load_value::<bool>(&self.db, &keys::online(&customer.id)).await? {
            customer.online = online;
        }
        if let Some(blocked) = load_value::<bool>(&self.db, &keys::blocked(&customer.id)).await? {
            customer.blocked = blocked;
        }
        if let Some(seen) =
            load_value::<DateTime<Utc>>(&self.db, &keys::last_seen(&customer.id)).await?
        {
            customer.last_seen = Some(seen);
        }
        Ok(customer)
    }

    async fn write_flags(&self, customer: &Customer) -> Result<(), SouqError> {
        store_value(&self.db, &keys::online(&customer.id), &customer.online).await?;
        store_value(&self.db, &keys::blocked(&customer.id), &customer.blocked).await?;
        match customer.last_seen {
            Some(seen) => store_value(&self.db, &keys::last_seen(&customer.id), &seen).await,
            None => kv::remove_item(&self.db, &keys::last_seen(&customer.id)).await,
        }
    }
}

#[async_trait]
impl BackendAdapter for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, SouqError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SouqError> {
        if self.config.wal_mode {
            self.db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for LocalStore {
    async fn insert_message(&self, message: &Message) -> Result<(), SouqError> {
        let message = message.clone();
        let key = Self::message_key(message.direction);
        update_list(&self.db, key, move |items: &mut Vec<Message>| items.push(message)).await
    }

    async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, SouqError> {
        let mut merged: Vec<Message> = load_list(&self.db, keys::CUSTOMER_MESSAGES).await?;
        merged.extend(load_list::<Message>(&self.db, keys::SUPPORT_MESSAGES).await?);
        merged.retain(|m| m.customer_id == customer_id);
        // Stable: equal timestamps keep customer-before-support, then insertion order.
        merged.sort_by_key(|m| m.created_at);
        Ok(merged)
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, SouqError> {
        for key in [keys::CUSTOMER_MESSAGES, keys::SUPPORT_MESSAGES] {
            let items: Vec<Message> = load_list(&self.db, key).await?;
            if let Some(found) = items.into_iter().find(|m| m.id == id) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    async fn set_reply(&self, message_id: &str, reply: &Reply) -> Result<(), SouqError> {
        for key in [keys::CUSTOMER_MESSAGES, keys::SUPPORT_MESSAGES] {
            let id = message_id.to_string();
            let reply = reply.clone();
            let updated = update_list(&self.db, key, move |items: &mut Vec<Message>| {
                match items.iter_mut().find(|m| m.id == id) {
                    Some(message) => {
                        message.reply = Some(reply);
                        true
                    }
                    None => false,
                }
            })
            .await?;
            if updated {
                return Ok(());
            }
        }
        Err(SouqError::not_found("message", message_id))
    }

    async fn mark_messages_read(&self, customer_id: &str) -> Result<u32, SouqError> {
        let customer_id = customer_id.to_string();
        update_list(
            &self.db,
            keys::CUSTOMER_MESSAGES,
            move |items: &mut Vec<Message>| {
                let mut changed = 0;
                for message in items
                    .iter_mut()
                    .filter(|m| m.customer_id == customer_id && !m.read)
                {
                    message.read = true;
                    changed += 1;
                }
                changed
            },
        )
        .await
    }

    async fn delete_messages(&self, customer_id: &str) -> Result<(), SouqError> {
        for key in [keys::CUSTOMER_MESSAGES, keys::SUPPORT_MESSAGES] {
            let customer_id = customer_id.to_string();
            update_list(&self.db, key, move |items: &mut Vec<Message>| {
                items.retain(|m| m.customer_id != customer_id)
            })
            .await?;
        }
        Ok(())
    }

    async fn get_session(&self, customer_id: &str) -> Result<Option<Session>, SouqError> {
        let sessions: Vec<Session> = load_list(&self.db, keys::SESSIONS).await?;
        Ok(sessions.into_iter().find(|s| s.customer_id == customer_id))
    }

    async fn put_session(&self, session: &Session) -> Result<(), SouqError> {
        let session = session.clone();
        update_list(&self.db, keys::SESSIONS, move |items: &mut Vec<Session>| {
            match items.iter_mut().find(|s| s.customer_id == session.customer_id) {
                Some(existing) => *existing = session,
                None => items.push(session),
            }
        })
        .await
    }

    async fn update_session(
        &self,
        customer_id: &str,
        update: SessionUpdate,
    ) -> Result<Session, SouqError> {
        let customer_id = customer_id.to_string();
        update_list(
            &self.db,
            keys::SESSIONS,
            move |items: &mut Vec<Session>| -> Result<Session, SouqError> {
                let pos = items.iter().position(|s| s.customer_id == customer_id);
                let next = update(pos.map(|i| items[i].clone()))?;
                match pos {
                    Some(i) => items[i] = next.clone(),
                    None => items.push(next.clone()),
                }
                Ok(next)
            },
        )
        .await?
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, SouqError> {
        let mut sessions: Vec<Session> = load_list(&self.db, keys::SESSIONS).await?;
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(sessions)
    }

    async fn delete_session(&self, customer_id: &str) -> Result<(), SouqError> {
        let customer_id = customer_id.to_string();
        update_list(&self.db, keys::SESSIONS, move |items: &mut Vec<Session>| {
            items.retain(|s| s.customer_id != customer_id)
        })
        .await
    }
}

#[async_trait]
impl AccountRepository for LocalStore {
    async fn insert_customer(&self, customer: &Customer) -> Result<(), SouqError> {
        let record = customer.clone();
        update_list(&self.db, keys::CUSTOMERS, move |items: &mut Vec<Customer>| {
            items.push(record)
        })
        .await?;
        self.write_flags(customer).await
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, SouqError> {
        let customers: Vec<Customer> = load_list(&self.db, keys::CUSTOMERS).await?;
        match customers.into_iter().find(|c| c.id == id) {
            Some(customer) => Ok(Some(self.with_flags(customer).await?)),
            None => Ok(None),
        }
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, SouqError> {
        let customers: Vec<Customer> = load_list(&self.db, keys::CUSTOMERS).await?;
        match customers
            .into_iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
        {
            Some(customer) => Ok(Some(self.with_flags(customer).await?)),
            None => Ok(None),
        }
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, SouqError> {
        let customers: Vec<Customer> = load_list(&self.db, keys::CUSTOMERS).await?;
        let mut out = Vec::with_capacity(customers.len());
        for customer in customers {
            out.push(self.with_flags(customer).await?);
        }
        out.sort_by_key(|c| c.created_at);
        Ok(out)
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), SouqError> {
        let record = customer.clone();
        let found = update_list(&self.db, keys::CUSTOMERS, move |items: &mut Vec<Customer>| {
            match items.iter_mut().find(|c| c.id == record.id) {
                Some(existing) => {
                    *existing = record;
                    true
                }
                None => false,
            }
        })
        .await?;
        if !found {
            return Err(SouqError::not_found("customer", &customer.id));
        }
        self.write_flags(customer).await
    }

    async fn delete_customer(&self, id: &str) -> Result<(), SouqError> {
        let target = id.to_string();
        update_list(&self.db, keys::CUSTOMERS, move |items: &mut Vec<Customer>| {
            items.retain(|c| c.id != target)
        })
        .await?;
        for key in [keys::online(id), keys::blocked(id), keys::last_seen(id)] {
            kv::remove_item(&self.db, &key).await?;
        }
        Ok(())
    }

    async fn record_login_attempt(&self, attempt: &LoginAttempt) -> Result<(), SouqError> {
        let attempt = attempt.clone();
        let cap = self.config.login_attempt_cap;
        let dropped = update_list(
            &self.db,
            keys::LOGIN_ATTEMPTS,
            move |items: &mut Vec<LoginAttempt>| {
                items.push(attempt);
                let excess = items.len().saturating_sub(cap);
                items.drain(..excess);
                excess
            },
        )
        .await?;
        if dropped > 0 {
            debug!(dropped, cap, "login attempt log trimmed");
        }
        Ok(())
    }

    async fn list_login_attempts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LoginAttempt>, SouqError> {
        let attempts: Vec<LoginAttempt> = load_list(&self.db, keys::LOGIN_ATTEMPTS).await?;
        Ok(attempts
            .into_iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }
}

#[async_trait]
impl MediaStore for LocalStore {
    /// Inline the file as a `data:` URL; nothing leaves the device.
    async fn upload(&self, upload: &MediaUpload) -> Result<String, SouqError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&upload.bytes);
        debug!(
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "media inlined as data URL"
        );
        Ok(format!("data:{};base64,{encoded}", upload.content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use souq_core::{Attachment, AttachmentKind, SessionStatus};
    use tempfile::tempdir;

    fn make_config(path: &str) -> LocalBackendConfig {
        LocalBackendConfig {
            database_path: path.to_string(),
            wal_mode: true,
            login_attempt_cap: 3,
        }
    }

    async fn setup_store() -> (LocalStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("local.db");
        let store = LocalStore::open(make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();
        (store, dir)
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, secs).unwrap()
    }

    fn make_msg(id: &str, customer: &str, direction: Direction, secs: u32) -> Message {
        Message {
            id: id.to_string(),
            customer_id: customer.to_string(),
            body: format!("body {id}"),
            attachments: Vec::new(),
            direction,
            read: false,
            reply: None,
            created_at: at(secs),
        }
    }

    fn make_customer(id: &str, email: &str) -> Customer {
        Customer {
            id: id.to_string(),
            email: email.to_string(),
            credential_hash: "$argon2id$stub".to_string(),
            verified: false,
            blocked: false,
            online: false,
            last_seen: None,
            created_at: at(0),
        }
    }

    #[tokio::test]
    async fn local_store_reports_name_and_health() {
        let (store, _dir) = setup_store().await;
        assert_eq!(store.name(), "local");
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn messages_are_split_by_direction_and_merged_in_time_order() {
        let (store, _dir) = setup_store().await;
        store
            .insert_message(&make_msg("m3", "c1", Direction::Customer, 3))
            .await
            .unwrap();
        store
            .insert_message(&make_msg("m2", "c1", Direction::Support, 2))
            .await
            .unwrap();
        store
            .insert_message(&make_msg("m1", "c1", Direction::Customer, 1))
            .await
            .unwrap();
        store
            .insert_message(&make_msg("other", "c2", Direction::Customer, 0))
            .await
            .unwrap();

        let raw_support = kv::get_item(&store.db, keys::SUPPORT_MESSAGES)
            .await
            .unwrap()
            .unwrap();
        assert!(raw_support.contains("\"m2\""));

        let ids: Vec<String> = store
            .list_messages("c1")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn collections_round_trip_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let config = make_config(db_path.to_str().unwrap());

        let mut expected = Vec::new();
        {
            let store = LocalStore::open(config.clone()).await.unwrap();
            for (i, direction) in [Direction::Support, Direction::Customer, Direction::Customer]
                .into_iter()
                .enumerate()
            {
                let mut msg = make_msg(&format!("m{i}"), "c1", direction, 10 - i as u32);
                msg.attachments = vec![Attachment::new(AttachmentKind::Image, "data:image/png;base64,AA==")];
                store.insert_message(&msg).await.unwrap();
                expected.push(msg);
            }
            store.shutdown().await.unwrap();
        }
        expected.sort_by_key(|m| m.created_at);

        let reopened = LocalStore::open(config).await.unwrap();
        assert_eq!(reopened.list_messages("c1").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn reply_and_read_flags_are_persisted() {
        let (store, _dir) = setup_store().await;
        store
            .insert_message(&make_msg("m1", "c1", Direction::Customer, 1))
            .await
            .unwrap();
        store
            .insert_message(&make_msg("m2", "c1", Direction::Customer, 2))
            .await
            .unwrap();

        let reply = Reply {
            body: "أهلاً".to_string(),
            replied_at: at(5),
        };
        store.set_reply("m1", &reply).await.unwrap();
        assert_eq!(
            store.get_message("m1").await.unwrap().unwrap().reply,
            Some(reply.clone())
        );

        assert_eq!(store.mark_messages_read("c1").await.unwrap(), 2);
        assert_eq!(store.mark_messages_read("c1").await.unwrap(), 0);

        let err = store.set_reply("missing", &reply).await.unwrap_err();
        assert!(matches!(err, SouqError::NotFound { entity: "message", .. }));
    }

    #[tokio::test]
    async fn sessions_upsert_and_sort_by_activity() {
        let (store, _dir) = setup_store().await;
        let mut s1 = Session {
            customer_id: "c1".into(),
            status: SessionStatus::Waiting,
            last_activity: at(1),
            unread_count: 1,
            created_at: at(1),
        };
        let s2 = Session {
            customer_id: "c2".into(),
            last_activity: at(2),
            ..s1.clone()
        };
        store.put_session(&s1).await.unwrap();
        store.put_session(&s2).await.unwrap();

        s1.last_activity = at(9);
        s1.status = SessionStatus::Active;
        store.put_session(&s1).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].customer_id, "c1");
        assert_eq!(sessions[0].status, SessionStatus::Active);

        store.delete_session("c1").await.unwrap();
        assert!(store.get_session("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn customer_flags_live_in_their_own_keys() {
        let (store, _dir) = setup_store().await;
        let mut customer = make_customer("c1", "sara@example.com");
        store.insert_customer(&customer).await.unwrap();

        customer.blocked = true;
        customer.online = true;
        customer.last_seen = Some(at(30));
        store.update_customer(&customer).await.unwrap();

        assert_eq!(
            kv::get_item(&store.db, &keys::blocked("c1")).await.unwrap().as_deref(),
            Some("true")
        );

        // Flag keys win over the copy in the customer list.
        store_value(&store.db, &keys::blocked("c1"), &false).await.unwrap();
        let loaded = store
            .find_customer_by_email("SARA@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(!loaded.blocked);
        assert!(loaded.online);
        assert_eq!(loaded.last_seen, Some(at(30)));

        store.delete_customer("c1").await.unwrap();
        assert!(store.get_customer("c1").await.unwrap().is_none());
        assert!(kv::get_item(&store.db, &keys::online("c1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updating_unknown_customer_is_not_found() {
        let (store, _dir) = setup_store().await;
        let err = store
            .update_customer(&make_customer("ghost", "g@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, SouqError::NotFound { entity: "customer", .. }));
    }

    #[tokio::test]
    async fn login_attempts_are_capped_oldest_first() {
        let (store, _dir) = setup_store().await;
        for i in 0..5 {
            let attempt = LoginAttempt {
                id: format!("a{i}"),
                email: "sara@example.com".into(),
                credential: "******".into(),
                success: i % 2 == 0,
                created_at: at(i),
            };
            store.record_login_attempt(&attempt).await.unwrap();
        }

        let all = store.list_login_attempts(None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a4", "a3", "a2"]);

        let latest = store.list_login_attempts(Some(1)).await.unwrap();
        assert_eq!(latest[0].id, "a4");
    }

    #[tokio::test]
    async fn upload_returns_data_url() {
        let (store, _dir) = setup_store().await;
        let url = store
            .upload(&MediaUpload {
                user_id: "c1".into(),
                folder: "chat".into(),
                file_name: "a.png".into(),
                content_type: "image/png".into(),
                bytes: b"hi".to_vec(),
            })
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,aGk=");
    }
}
