// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Souq support chat.
//!
//! This crate provides the domain types, the error taxonomy, the session
//! lifecycle table, and the repository traits implemented by the local and
//! hosted persistence backends.

pub mod error;
pub mod lifecycle;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SouqError;
pub use lifecycle::transition;
pub use types::{
    Attachment, AttachmentKind, Customer, Direction, HealthStatus, Language, LoginAttempt,
    MediaUpload, Message, Reply, Session, SessionEvent, SessionStatus,
};

pub use traits::{AccountRepository, BackendAdapter, ChatRepository, MediaStore, SessionUpdate};
