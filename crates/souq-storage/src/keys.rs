// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage key layout.
//!
//! Names match the storefront's browser storage so exported blobs can be
//! loaded unchanged.

/// Registered customers.
pub const CUSTOMERS: &str = "customers";

/// Customer-authored chat messages.
pub const CUSTOMER_MESSAGES: &str = "support_messages";

/// Support-authored chat messages.
pub const SUPPORT_MESSAGES: &str = "admin_messages";

/// Per-customer session index.
pub const SESSIONS: &str = "chat_sessions";

/// Login audit trail.
pub const LOGIN_ATTEMPTS: &str = "login_attempts";

pub fn online(customer_id: &str) -> String {
    format!("customer_online_{customer_id}")
}

pub fn blocked(customer_id: &str) -> String {
    format!("customer_blocked_{customer_id}")
}

pub fn last_seen(customer_id: &str) -> String {
    format!("customer_last_seen_{customer_id}")
}
