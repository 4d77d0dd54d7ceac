// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle table.
//!
//! ```text
//!             CustomerMessage  SupportMessage  Close    Reopen
//!   waiting   waiting          active          closed   -
//!   active    active           active          closed   -
//!   closed    closed           active          -        waiting
//! ```
//!
//! Cells marked `-` are rejected with [`SouqError::IllegalTransition`].

use crate::error::SouqError;
use crate::types::{Language, SessionEvent, SessionStatus};

/// Computes the status that follows `current` when `event` occurs.
pub fn transition(current: SessionStatus, event: SessionEvent) -> Result<SessionStatus, SouqError> {
    use SessionEvent::*;
    use SessionStatus::*;

    match (current, event) {
        (Waiting, CustomerMessage) => Ok(Waiting),
        (Active, CustomerMessage) => Ok(Active),
        // A closed conversation stays closed until staff reopen it.
        (Closed, CustomerMessage) => Ok(Closed),
        (_, SupportMessage) => Ok(Active),
        (Waiting | Active, Close) => Ok(Closed),
        (Closed, Reopen) => Ok(Waiting),
        (Closed, Close) | (Waiting | Active, Reopen) => Err(SouqError::IllegalTransition {
            from: current,
            event,
        }),
    }
}

impl SessionStatus {
    /// Human-readable label in the storefront language.
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (SessionStatus::Waiting, Language::Ar) => "بانتظار الرد",
            (SessionStatus::Active, Language::Ar) => "نشطة",
            (SessionStatus::Closed, Language::Ar) => "مغلقة",
            (SessionStatus::Waiting, Language::En) => "waiting",
            (SessionStatus::Active, Language::En) => "active",
            (SessionStatus::Closed, Language::En) => "closed",
        }
    }
}
