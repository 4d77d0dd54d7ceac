// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./souq.toml` > `~/.config/souq/souq.toml` > `/etc/souq/souq.toml`
//! with environment variable overrides via `SOUQ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SouqConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/souq/souq.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "souq.toml";

/// Per-user configuration file under the XDG config directory.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("souq/souq.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/souq/souq.toml` (system-wide)
/// 3. `~/.config/souq/souq.toml` (user XDG config)
/// 4. `./souq.toml` (local directory)
/// 5. `SOUQ_*` environment variables
pub fn load_config() -> Result<SouqConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SouqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SouqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SouqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SouqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SouqConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SOUQ_BACKEND_HOSTED_API_KEY` must map to
/// `backend.hosted.api_key`, not `backend.hosted.api.key`.
fn env_provider() -> Env {
    Env::prefixed("SOUQ_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name to a dotted config path.
///
/// Figment hands the key over in its original case, so it is lowercased here.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    const SECTIONS: &[(&str, &str)] = &[
        ("backend_hosted_", "backend.hosted."),
        ("backend_local_", "backend.local."),
        ("backend_", "backend."),
        ("app_", "app."),
        ("chat_", "chat."),
        ("media_", "media."),
        ("accounts_", "accounts."),
    ];

    for (prefix, dotted) in SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{dotted}{rest}");
        }
    }
    key
}
