// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Souq support chat.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use souq_core::Language;

/// Top-level Souq configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to a local, single-device setup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SouqConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Persistence backend selection and settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Support chat behavior.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Attachment upload limits.
    #[serde(default)]
    pub media: MediaConfig,

    /// Customer credential hashing.
    #[serde(default)]
    pub accounts: AccountsConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Storefront display name.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Initial storefront language.
    #[serde(default)]
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_name: default_store_name(),
            log_level: default_log_level(),
            language: Language::default(),
        }
    }
}

fn default_store_name() -> String {
    "souq".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which persistence backend serves chat and account data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Single-device key/value store on the local disk.
    #[default]
    Local,
    /// Shared hosted tables and object storage.
    Hosted,
}

/// Persistence backend configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Active backend.
    #[serde(default)]
    pub kind: BackendKind,

    /// Local backend settings.
    #[serde(default)]
    pub local: LocalBackendConfig,

    /// Hosted backend settings.
    #[serde(default)]
    pub hosted: HostedBackendConfig,
}

/// Local key/value backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalBackendConfig {
    /// Path to the SQLite database file holding the key/value table.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Maximum number of login attempts retained; oldest are dropped first.
    #[serde(default = "default_login_attempt_cap")]
    pub login_attempt_cap: usize,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            login_attempt_cap: default_login_attempt_cap(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("souq").join("souq.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("souq.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_login_attempt_cap() -> usize {
    100
}

/// Hosted tables and object storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostedBackendConfig {
    /// Project base URL, e.g. `https://project.example.co`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Anonymous or service API key sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Object storage bucket for chat media.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HostedBackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_bucket() -> String {
    "chat-media".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Support chat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Seconds between poller refreshes.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Move a closed session back to `waiting` when the customer writes again.
    #[serde(default)]
    pub reopen_on_customer_message: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            reopen_on_customer_message: false,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

/// Attachment upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Storage folder used for chat uploads.
    #[serde(default = "default_folder")]
    pub folder: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            folder: default_folder(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_folder() -> String {
    "chat".to_string()
}

/// Customer credential configuration.
///
/// Argon2id parameters for credential hashes. Defaults follow the OWASP
/// minimum recommendation (19 MiB, 2 iterations, 1 lane).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    /// Minimum credential length accepted at registration.
    #[serde(default = "default_min_credential_len")]
    pub min_credential_len: usize,

    /// Argon2id memory cost in KiB.
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes.
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            min_credential_len: default_min_credential_len(),
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_min_credential_len() -> usize {
    6
}

fn default_kdf_memory_cost() -> u32 {
    19456
}

fn default_kdf_iterations() -> u32 {
    2
}

fn default_kdf_parallelism() -> u32 {
    1
}
