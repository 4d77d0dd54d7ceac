// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer account and login audit persistence.

use async_trait::async_trait;

use crate::error::SouqError;
use crate::traits::adapter::BackendAdapter;
use crate::types::{Customer, LoginAttempt};

/// Persistence for customers and the login-attempt audit trail.
#[async_trait]
pub trait AccountRepository: BackendAdapter {
    /// Persists a newly registered customer.
    async fn insert_customer(&self, customer: &Customer) -> Result<(), SouqError>;

    /// Looks up a customer by ID.
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, SouqError>;

    /// Looks up a customer by normalized (lowercase) email.
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, SouqError>;

    /// Returns all customers, oldest registration first.
    async fn list_customers(&self) -> Result<Vec<Customer>, SouqError>;

    /// Overwrites the mutable fields of an existing customer.
    async fn update_customer(&self, customer: &Customer) -> Result<(), SouqError>;

    /// Hard-deletes a customer record.
    async fn delete_customer(&self, id: &str) -> Result<(), SouqError>;

    /// Appends a login attempt to the audit trail.
    async fn record_login_attempt(&self, attempt: &LoginAttempt) -> Result<(), SouqError>;

    /// Returns login attempts, newest first, optionally limited.
    async fn list_login_attempts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LoginAttempt>, SouqError>;
}
