// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Souq support chat.

use thiserror::Error;

use crate::types::{SessionEvent, SessionStatus};

/// The primary error type shared by repositories, services, and the CLI.
#[derive(Debug, Error)]
pub enum SouqError {
    /// Configuration errors (missing backend credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local storage errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Hosted backend errors (HTTP failure, non-success status, bad payload).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced customer, message, or session does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before reaching a backend.
    #[error("validation error: {0}")]
    Validation(String),

    /// Registration or login refused.
    #[error("authentication error: {0}")]
    Auth(String),

    /// A session status change not permitted by the lifecycle table.
    #[error("illegal session transition: {event} while {from}")]
    IllegalTransition {
        from: SessionStatus,
        event: SessionEvent,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SouqError {
    /// Shorthand for a [`SouqError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps a serialization failure as a storage error.
    pub fn serialization(err: serde_json::Error) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
