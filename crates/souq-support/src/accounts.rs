// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer registration, login, and administration.
//!
//! Credentials are hashed with Argon2id using a random salt from the system
//! RNG and stored as PHC strings. Every login attempt is recorded with the
//! credential masked to its length.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use souq_bus::{BusEvent, EventBus};
use souq_config::model::AccountsConfig;
use souq_core::{AccountRepository, ChatRepository, Customer, LoginAttempt, SouqError};
use tracing::{info, warn};

const BAD_LOGIN: &str = "invalid email or credential";

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The credential as recorded in the audit trail.
pub fn mask_credential(credential: &str) -> String {
    "*".repeat(credential.chars().count())
}

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    chat: Arc<dyn ChatRepository>,
    config: AccountsConfig,
    bus: EventBus,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        chat: Arc<dyn ChatRepository>,
        config: AccountsConfig,
        bus: EventBus,
    ) -> Self {
        Self {
            accounts,
            chat,
            config,
            bus,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, SouqError> {
        let params = Params::new(
            self.config.kdf_memory_cost,
            self.config.kdf_iterations,
            self.config.kdf_parallelism,
            None,
        )
        .map_err(|e| SouqError::Config(format!("invalid Argon2id parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn hash_credential(&self, credential: &str) -> Result<String, SouqError> {
        let mut salt = [0u8; 16];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| SouqError::Internal("failed to generate random salt".into()))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| SouqError::Internal(format!("salt encoding failed: {e}")))?;
        let hash = self
            .hasher()?
            .hash_password(credential.as_bytes(), &salt)
            .map_err(|e| SouqError::Internal(format!("Argon2id hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify_credential(credential: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(credential.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!(error = %e, "stored credential hash is unreadable");
                false
            }
        }
    }

    /// Create a customer account.
    pub async fn register(&self, email: &str, credential: &str) -> Result<Customer, SouqError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(SouqError::Validation(format!("invalid email address: {email:?}")));
        }
        if credential.chars().count() < self.config.min_credential_len {
            return Err(SouqError::Validation(format!(
                "credential must be at least {} characters",
                self.config.min_credential_len
            )));
        }
        if self.accounts.find_customer_by_email(&email).await?.is_some() {
            return Err(SouqError::Auth(format!("email already registered: {email}")));
        }

        let customer = Customer {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            credential_hash: self.hash_credential(credential)?,
            verified: false,
            blocked: false,
            online: false,
            last_seen: None,
            created_at: Utc::now(),
        };
        self.accounts.insert_customer(&customer).await?;
        info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    /// Check credentials and mark the customer online.
    ///
    /// Blocked customers are refused even with a correct credential.
    pub async fn login(&self, email: &str, credential: &str) -> Result<Customer, SouqError> {
        let email = normalize_email(email);
        let outcome = match self.accounts.find_customer_by_email(&email).await? {
            None => Err(SouqError::Auth(BAD_LOGIN.into())),
            Some(c) if !Self::verify_credential(credential, &c.credential_hash) => {
                Err(SouqError::Auth(BAD_LOGIN.into()))
            }
            Some(c) if c.blocked => Err(SouqError::Auth("account is blocked".into())),
            Some(c) => Ok(c),
        };

        self.accounts
            .record_login_attempt(&LoginAttempt {
                id: uuid::Uuid::new_v4().to_string(),
                email: email.clone(),
                credential: mask_credential(credential),
                success: outcome.is_ok(),
                created_at: Utc::now(),
            })
            .await?;

        let mut customer = match outcome {
            Ok(customer) => customer,
            Err(e) => {
                warn!(email = %email, error = %e, "login refused");
                return Err(e);
            }
        };
        customer.online = true;
        customer.last_seen = Some(Utc::now());
        self.accounts.update_customer(&customer).await?;
        info!(customer_id = %customer.id, "customer logged in");
        Ok(customer)
    }

    async fn require(&self, customer_id: &str) -> Result<Customer, SouqError> {
        self.accounts
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| SouqError::not_found("customer", customer_id))
    }

    pub async fn get(&self, customer_id: &str) -> Result<Customer, SouqError> {
        self.require(customer_id).await
    }

    pub async fn set_blocked(&self, customer_id: &str, blocked: bool) -> Result<Customer, SouqError> {
        let mut customer = self.require(customer_id).await?;
        customer.blocked = blocked;
        if blocked {
            customer.online = false;
        }
        self.accounts.update_customer(&customer).await?;
        info!(customer_id, blocked, "customer block flag updated");
        self.bus.publish(BusEvent::CustomerBlocked {
            customer_id: customer_id.to_string(),
            blocked,
        });
        Ok(customer)
    }

    /// Presence update; going offline also stamps `last_seen`.
    pub async fn set_online(&self, customer_id: &str, online: bool) -> Result<Customer, SouqError> {
        let mut customer = self.require(customer_id).await?;
        customer.online = online;
        if !online {
            customer.last_seen = Some(Utc::now());
        }
        self.accounts.update_customer(&customer).await?;
        Ok(customer)
    }

    pub async fn touch_last_seen(&self, customer_id: &str) -> Result<Customer, SouqError> {
        let mut customer = self.require(customer_id).await?;
        customer.last_seen = Some(Utc::now());
        self.accounts.update_customer(&customer).await?;
        Ok(customer)
    }

    /// Remove the customer together with their messages and session.
    pub async fn delete_customer(&self, customer_id: &str) -> Result<(), SouqError> {
        self.require(customer_id).await?;
        self.chat.delete_messages(customer_id).await?;
        self.chat.delete_session(customer_id).await?;
        self.accounts.delete_customer(customer_id).await?;
        info!(customer_id, "customer deleted");
        Ok(())
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, SouqError> {
        self.accounts.list_customers().await
    }

    pub async fn list_login_attempts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LoginAttempt>, SouqError> {
        self.accounts.list_login_attempts(limit).await
    }
}
