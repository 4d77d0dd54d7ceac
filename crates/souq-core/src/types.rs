// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by both persistence backends.
//!
//! Field names are the wire names: the local backend stores these structs as
//! JSON blobs and the hosted backend maps them one-to-one onto table columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who authored a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Written by the customer through the storefront widget.
    Customer,
    /// Written by support staff from the back-office.
    Support,
}

/// Media category of an attachment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

/// A media item sent with a message.
///
/// `url` is either an inline `data:` URL (local backend) or a public bucket
/// URL (hosted backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    pub fn new(kind: AttachmentKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A support reply stored inline on a customer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub body: String,
    pub replied_at: DateTime<Utc>,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub customer_id: String,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub direction: Direction,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub reply: Option<Reply>,
    pub created_at: DateTime<Utc>,
}

/// Conversation lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Customer has written; no support reply yet.
    Waiting,
    /// Support has replied at least once.
    Active,
    /// Closed by support staff.
    Closed,
}

/// Events that drive [`SessionStatus`] changes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    CustomerMessage,
    SupportMessage,
    Close,
    Reopen,
}

impl From<Direction> for SessionEvent {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Customer => SessionEvent::CustomerMessage,
            Direction::Support => SessionEvent::SupportMessage,
        }
    }
}

/// Aggregate conversation state for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub customer_id: String,
    pub status: SessionStatus,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A registered storefront customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: String,
    /// Argon2id PHC string.
    pub credential_hash: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit row for a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: String,
    pub email: String,
    /// The credential as entered, masked to its length.
    pub credential: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

/// A file handed to a [`MediaStore`](crate::traits::MediaStore).
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub user_id: String,
    pub folder: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// File extension taken from `file_name`, or `bin` when absent.
    pub fn extension(&self) -> &str {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("bin")
    }

    /// Attachment category inferred from the MIME type.
    pub fn kind(&self) -> AttachmentKind {
        if self.content_type.starts_with("image/") {
            AttachmentKind::Image
        } else if self.content_type.starts_with("video/") {
            AttachmentKind::Video
        } else {
            AttachmentKind::File
        }
    }
}

/// Storefront display language.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl Language {
    /// Text direction attribute for the language.
    pub fn text_direction(self) -> &'static str {
        match self {
            Language::Ar => "rtl",
            Language::En => "ltr",
        }
    }
}

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is reachable but reporting problems.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}
