// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Souq configuration system.

use souq_config::diagnostic::ConfigError;
use souq_config::model::BackendKind;
use souq_config::{load_and_validate_str, load_config_from_str};
use souq_core::Language;

/// Valid TOML with every section deserializes successfully.
#[test]
fn full_toml_deserializes_into_souq_config() {
    let toml = r#"
[app]
store_name = "متجر"
log_level = "debug"
language = "en"

[backend]
kind = "hosted"

[backend.local]
database_path = "/tmp/souq-test.db"
wal_mode = false
login_attempt_cap = 50

[backend.hosted]
base_url = "https://shop.example.co"
api_key = "anon-key"
bucket = "media"
timeout_secs = 10

[chat]
poll_interval_secs = 2
reopen_on_customer_message = true

[media]
max_upload_bytes = 1024
folder = "support"

[accounts]
min_credential_len = 8
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.store_name, "متجر");
    assert_eq!(config.app.language, Language::En);
    assert_eq!(config.backend.kind, BackendKind::Hosted);
    assert_eq!(config.backend.local.database_path, "/tmp/souq-test.db");
    assert!(!config.backend.local.wal_mode);
    assert_eq!(config.backend.local.login_attempt_cap, 50);
    assert_eq!(config.backend.hosted.bucket, "media");
    assert_eq!(config.backend.hosted.timeout_secs, 10);
    assert_eq!(config.chat.poll_interval_secs, 2);
    assert!(config.chat.reopen_on_customer_message);
    assert_eq!(config.media.max_upload_bytes, 1024);
    assert_eq!(config.media.folder, "support");
    assert_eq!(config.accounts.min_credential_len, 8);
    assert_eq!(config.accounts.kdf_iterations, 2);
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.backend.kind, BackendKind::Local);
    assert_eq!(config.chat.poll_interval_secs, 5);
    assert_eq!(config.app.log_level, "info");
}

/// A misspelled key is reported with a suggestion.
#[test]
fn unknown_key_in_chat_suggests_correction() {
    let toml = r#"
[chat]
pol_interval_secs = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "pol_interval_secs" && s == "poll_interval_secs"
        )
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// An unsupported backend kind is a variant error, not a generic one.
#[test]
fn unknown_backend_kind_reports_accepted_values() {
    let toml = r#"
[backend]
kind = "firebase"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject kind");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::InvalidVariant { value, expected, .. }
            if value == "firebase" && expected.contains("local") && expected.contains("hosted"))
    });
    assert!(found, "expected InvalidVariant, got: {errors:?}");
}

/// Wrong value types are reported with the expected type.
#[test]
fn wrong_type_for_poll_interval() {
    let toml = r#"
[chat]
poll_interval_secs = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn hosted_without_credentials_fails_validation() {
    let toml = r#"
[backend]
kind = "hosted"
"#;

    let errors = load_and_validate_str(toml).expect_err("hosted needs url and key");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}
