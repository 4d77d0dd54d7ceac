// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait every persistence backend implements.

use async_trait::async_trait;

use crate::error::SouqError;
use crate::types::HealthStatus;

/// Identity, health, and lifecycle shared by all backend adapters.
#[async_trait]
pub trait BackendAdapter: Send + Sync + 'static {
    /// Returns the configured backend name (`local` or `hosted`).
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, SouqError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), SouqError>;
}
