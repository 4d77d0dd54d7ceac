// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: the selected backend has
//! what it needs, intervals and limits are positive, and KDF parameters are
//! usable.

use crate::diagnostic::ConfigError;
use crate::model::{BackendKind, SouqConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &SouqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "app.log_level `{}` must be one of: {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    match config.backend.kind {
        BackendKind::Local => {
            if config.backend.local.database_path.trim().is_empty() {
                errors.push(ConfigError::validation(
                    "backend.local.database_path must not be empty",
                ));
            }
        }
        BackendKind::Hosted => {
            let hosted = &config.backend.hosted;
            match hosted.base_url.as_deref().map(str::trim) {
                None | Some("") => errors.push(ConfigError::validation(
                    "backend.hosted.base_url is required when backend.kind = \"hosted\"",
                )),
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    errors.push(ConfigError::validation(format!(
                        "backend.hosted.base_url `{url}` must start with http:// or https://"
                    )));
                }
                Some(_) => {}
            }
            if hosted.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                errors.push(ConfigError::validation(
                    "backend.hosted.api_key is required when backend.kind = \"hosted\"",
                ));
            }
            if hosted.bucket.trim().is_empty() {
                errors.push(ConfigError::validation(
                    "backend.hosted.bucket must not be empty",
                ));
            }
            if hosted.timeout_secs == 0 {
                errors.push(ConfigError::validation(
                    "backend.hosted.timeout_secs must be at least 1",
                ));
            }
        }
    }

    if config.backend.local.login_attempt_cap == 0 {
        errors.push(ConfigError::validation(
            "backend.local.login_attempt_cap must be at least 1",
        ));
    }

    if config.chat.poll_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "chat.poll_interval_secs must be at least 1",
        ));
    }

    if config.media.max_upload_bytes == 0 {
        errors.push(ConfigError::validation(
            "media.max_upload_bytes must be greater than 0",
        ));
    }

    if config.media.folder.trim().is_empty() || config.media.folder.contains('/') {
        errors.push(ConfigError::validation(format!(
            "media.folder `{}` must be a single non-empty path segment",
            config.media.folder
        )));
    }

    let accounts = &config.accounts;
    if accounts.min_credential_len == 0 {
        errors.push(ConfigError::validation(
            "accounts.min_credential_len must be at least 1",
        ));
    }
    if accounts.kdf_parallelism < 1 {
        errors.push(ConfigError::validation(format!(
            "accounts.kdf_parallelism must be at least 1, got {}",
            accounts.kdf_parallelism
        )));
    }
    if accounts.kdf_iterations < 1 {
        errors.push(ConfigError::validation(format!(
            "accounts.kdf_iterations must be at least 1, got {}",
            accounts.kdf_iterations
        )));
    }
    // Argon2 requires at least 8 KiB of memory per lane.
    if accounts.kdf_memory_cost < 8 * accounts.kdf_parallelism.max(1) {
        errors.push(ConfigError::validation(format!(
            "accounts.kdf_memory_cost must be at least {} KiB, got {}",
            8 * accounts.kdf_parallelism.max(1),
            accounts.kdf_memory_cost
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
