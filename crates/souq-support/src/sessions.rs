// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-customer session index.
//!
//! Every status change goes through [`transition`]; there is no way to
//! overwrite a status directly. Each session change is a single
//! [`ChatRepository::update_session`] call, so concurrent senders never lose
//! an increment. Message appends and session updates are still separate
//! writes, so a crash in between can leave `unread_count` out of step with
//! the messages. [`SessionIndex::repair_session`] recomputes it.

use std::sync::Arc;

use chrono::Utc;
use souq_core::{
    transition, ChatRepository, Direction, Session, SessionEvent, SessionStatus, SouqError,
};
use tracing::{debug, info};

#[derive(Clone)]
pub struct SessionIndex {
    repo: Arc<dyn ChatRepository>,
    reopen_on_customer_message: bool,
}

fn missing(customer_id: &str) -> SouqError {
    SouqError::not_found("session", customer_id)
}

impl SessionIndex {
    pub fn new(repo: Arc<dyn ChatRepository>, reopen_on_customer_message: bool) -> Self {
        Self {
            repo,
            reopen_on_customer_message,
        }
    }

    pub async fn get(&self, customer_id: &str) -> Result<Option<Session>, SouqError> {
        self.repo.get_session(customer_id).await
    }

    /// Record a new message from `direction` on the customer's session.
    ///
    /// Creates the session in `waiting` when absent. Customer messages add
    /// exactly one to the unread counter; support messages make the session
    /// `active`. A closed session stays closed on a customer message unless
    /// reopening is enabled, in which case it goes back to `waiting`.
    pub async fn upsert_on_message(
        &self,
        customer_id: &str,
        direction: Direction,
    ) -> Result<Session, SouqError> {
        let id = customer_id.to_string();
        let reopen = self.reopen_on_customer_message;
        self.repo
            .update_session(
                customer_id,
                Box::new(move |current: Option<Session>| -> Result<Session, SouqError> {
                    let now = Utc::now();
                    let mut session = current.unwrap_or_else(|| {
                        debug!(customer_id = %id, "session created");
                        Session {
                            customer_id: id.clone(),
                            status: SessionStatus::Waiting,
                            last_activity: now,
                            unread_count: 0,
                            created_at: now,
                        }
                    });

                    if direction == Direction::Customer
                        && session.status == SessionStatus::Closed
                        && reopen
                    {
                        session.status = transition(session.status, SessionEvent::Reopen)?;
                        info!(customer_id = %id, "closed session reopened by customer message");
                    }

                    session.status = transition(session.status, SessionEvent::from(direction))?;
                    session.last_activity = now;
                    if direction == Direction::Customer {
                        session.unread_count = session.unread_count.saturating_add(1);
                    }
                    Ok(session)
                }),
            )
            .await
    }

    /// Flag the customer's messages read and zero the unread counter.
    ///
    /// Messages are flagged first. If the session record is missing it is
    /// rebuilt from the history, as [`SessionIndex::repair_session`] does.
    pub async fn mark_read(&self, customer_id: &str) -> Result<Session, SouqError> {
        let flagged = self.repo.mark_messages_read(customer_id).await?;
        let id = customer_id.to_string();
        let result = self
            .repo
            .update_session(
                customer_id,
                Box::new(move |current: Option<Session>| -> Result<Session, SouqError> {
                    let mut session = current.ok_or_else(|| missing(&id))?;
                    session.unread_count = 0;
                    Ok(session)
                }),
            )
            .await;
        let session = match result {
            Err(SouqError::NotFound { .. }) => {
                info!(customer_id, "session missing on read, rebuilding");
                self.repair_session(customer_id).await?
            }
            other => other?,
        };
        debug!(customer_id, flagged, "session marked read");
        Ok(session)
    }

    pub async fn close(&self, customer_id: &str) -> Result<Session, SouqError> {
        self.apply(customer_id, SessionEvent::Close).await
    }

    pub async fn reopen(&self, customer_id: &str) -> Result<Session, SouqError> {
        self.apply(customer_id, SessionEvent::Reopen).await
    }

    async fn apply(&self, customer_id: &str, event: SessionEvent) -> Result<Session, SouqError> {
        let id = customer_id.to_string();
        self.repo
            .update_session(
                customer_id,
                Box::new(move |current: Option<Session>| -> Result<Session, SouqError> {
                    let mut session = current.ok_or_else(|| missing(&id))?;
                    let from = session.status;
                    session.status = transition(from, event)?;
                    session.last_activity = Utc::now();
                    info!(customer_id = %id, %from, to = %session.status, %event, "session transition");
                    Ok(session)
                }),
            )
            .await
    }

    /// Sessions ordered by most recent activity, optionally filtered by status.
    pub async fn list(&self, status: Option<SessionStatus>) -> Result<Vec<Session>, SouqError> {
        let mut sessions = self.repo.list_sessions().await?;
        if let Some(status) = status {
            sessions.retain(|s| s.status == status);
        }
        Ok(sessions)
    }

    /// Sum of unread counters across all sessions.
    pub async fn total_unread(&self) -> Result<u64, SouqError> {
        let sessions = self.repo.list_sessions().await?;
        Ok(sessions.iter().map(|s| u64::from(s.unread_count)).sum())
    }

    /// Recompute a session from the stored messages.
    ///
    /// The unread counter becomes the number of unread customer messages.
    /// A missing session is rebuilt from the history: `active` if support has
    /// ever written, `waiting` otherwise. The existing status is kept.
    pub async fn repair_session(&self, customer_id: &str) -> Result<Session, SouqError> {
        let messages = self.repo.list_messages(customer_id).await?;
        let unread = messages
            .iter()
            .filter(|m| m.direction == Direction::Customer && !m.read)
            .count();
        let unread = u32::try_from(unread).unwrap_or(u32::MAX);
        let span = messages.first().zip(messages.last()).map(|(first, last)| {
            (first.created_at, last.created_at)
        });
        let support_wrote = messages.iter().any(|m| m.direction == Direction::Support);

        let id = customer_id.to_string();
        self.repo
            .update_session(
                customer_id,
                Box::new(move |current: Option<Session>| -> Result<Session, SouqError> {
                    match current {
                        Some(mut session) => {
                            if session.unread_count != unread {
                                info!(
                                    customer_id = %id,
                                    stored = session.unread_count,
                                    actual = unread,
                                    "unread counter repaired"
                                );
                            }
                            session.unread_count = unread;
                            Ok(session)
                        }
                        None => {
                            let (created_at, last_activity) = span.ok_or_else(|| missing(&id))?;
                            let status = if support_wrote {
                                SessionStatus::Active
                            } else {
                                SessionStatus::Waiting
                            };
                            info!(customer_id = %id, %status, "session rebuilt from history");
                            Ok(Session {
                                customer_id: id,
                                status,
                                last_activity,
                                unread_count: unread,
                                created_at,
                            })
                        }
                    }
                }),
            )
            .await
    }

    /// Remove the session record.
    pub async fn delete(&self, customer_id: &str) -> Result<(), SouqError> {
        self.repo.delete_session(customer_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageStore;
    use crate::testing::local_repo;

    async fn setup(reopen: bool) -> (SessionIndex, MessageStore, tempfile::TempDir) {
        let (repo, dir) = local_repo().await;
        (
            SessionIndex::new(repo.clone(), reopen),
            MessageStore::new(repo),
            dir,
        )
    }

    #[tokio::test]
    async fn first_customer_message_creates_waiting_session() {
        let (index, _messages, _dir) = setup(false).await;
        let session = index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(session.unread_count, 1);
    }

    #[tokio::test]
    async fn unread_counts_customer_messages_and_resets_on_read() {
        let (index, _messages, _dir) = setup(false).await;
        for _ in 0..3 {
            index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        }
        let session = index.upsert_on_message("c1", Direction::Support).await.unwrap();
        assert_eq!(session.unread_count, 3);
        assert_eq!(session.status, SessionStatus::Active);

        let read = index.mark_read("c1").await.unwrap();
        assert_eq!(read.unread_count, 0);
        assert_eq!(index.get("c1").await.unwrap().unwrap().unread_count, 0);
        assert_eq!(index.total_unread().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_customer_messages_each_count_once() {
        let (index, _messages, _dir) = setup(false).await;
        index.upsert_on_message("c1", Direction::Customer).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let index = index.clone();
            tasks.push(tokio::spawn(async move {
                index.upsert_on_message("c1", Direction::Customer).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let session = index.get("c1").await.unwrap().unwrap();
        assert_eq!(session.unread_count, 21);
        assert_eq!(index.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_read_rebuilds_a_missing_session() {
        let (index, messages, _dir) = setup(false).await;
        messages.append("c1", "a", vec![], Direction::Customer).await.unwrap();

        // Message stored, session write lost.
        let session = index.mark_read("c1").await.unwrap();
        assert_eq!(session.unread_count, 0);
        assert_eq!(session.status, SessionStatus::Waiting);
        assert!(messages.list_by_customer("c1").await.unwrap()[0].read);
        assert!(index.get("c1").await.unwrap().is_some());

        assert!(matches!(
            index.mark_read("ghost").await.unwrap_err(),
            SouqError::NotFound { entity: "session", .. }
        ));
    }

    #[tokio::test]
    async fn support_message_activates_even_a_closed_session() {
        let (index, _messages, _dir) = setup(false).await;
        index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        index.close("c1").await.unwrap();
        let session = index.upsert_on_message("c1", Direction::Support).await.unwrap();
        assert_eq!(session.status, SessionStatus::Active);
    }

    #[tokio::test]
    async fn closed_session_stays_closed_on_customer_message() {
        let (index, _messages, _dir) = setup(false).await;
        index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        index.close("c1").await.unwrap();

        let session = index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.unread_count, 2);
    }

    #[tokio::test]
    async fn reopen_policy_moves_closed_back_to_waiting() {
        let (index, _messages, _dir) = setup(true).await;
        index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        index.close("c1").await.unwrap();

        let session = index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        assert_eq!(session.status, SessionStatus::Waiting);
    }

    #[tokio::test]
    async fn illegal_transitions_are_rejected() {
        let (index, _messages, _dir) = setup(false).await;
        index.upsert_on_message("c1", Direction::Customer).await.unwrap();

        let err = index.reopen("c1").await.unwrap_err();
        assert!(matches!(
            err,
            SouqError::IllegalTransition {
                from: SessionStatus::Waiting,
                event: SessionEvent::Reopen
            }
        ));

        index.close("c1").await.unwrap();
        assert!(index.close("c1").await.is_err());
        assert_eq!(index.reopen("c1").await.unwrap().status, SessionStatus::Waiting);

        assert!(matches!(
            index.close("nobody").await.unwrap_err(),
            SouqError::NotFound { entity: "session", .. }
        ));
    }

    #[tokio::test]
    async fn list_filters_by_status_newest_first() {
        let (index, _messages, _dir) = setup(false).await;
        index.upsert_on_message("c1", Direction::Customer).await.unwrap();
        index.upsert_on_message("c2", Direction::Customer).await.unwrap();
        index.upsert_on_message("c3", Direction::Customer).await.unwrap();
        index.close("c2").await.unwrap();

        let all: Vec<String> = index
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.customer_id)
            .collect();
        assert_eq!(all, vec!["c2", "c3", "c1"]);

        let waiting = index.list(Some(SessionStatus::Waiting)).await.unwrap();
        assert_eq!(waiting.len(), 2);
        assert_eq!(index.total_unread().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn repair_recomputes_counter_from_messages() {
        let (index, messages, _dir) = setup(false).await;
        messages.append("c1", "a", vec![], Direction::Customer).await.unwrap();
        messages.append("c1", "b", vec![], Direction::Customer).await.unwrap();
        messages.append("c1", "c", vec![], Direction::Support).await.unwrap();

        // Appends landed but the session write never happened.
        let rebuilt = index.repair_session("c1").await.unwrap();
        assert_eq!(rebuilt.unread_count, 2);
        assert_eq!(rebuilt.status, SessionStatus::Active);

        index.mark_read("c1").await.unwrap();
        messages.append("c1", "d", vec![], Direction::Customer).await.unwrap();
        let repaired = index.repair_session("c1").await.unwrap();
        assert_eq!(repaired.unread_count, 1);

        assert!(index.repair_session("ghost").await.is_err());
    }
}
