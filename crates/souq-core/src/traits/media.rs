// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media storage for chat attachments.

use async_trait::async_trait;

use crate::error::SouqError;
use crate::traits::adapter::BackendAdapter;
use crate::types::MediaUpload;

/// Stores uploaded media and returns a URL usable in an attachment.
#[async_trait]
pub trait MediaStore: BackendAdapter {
    /// Uploads the file and returns its URL.
    async fn upload(&self, upload: &MediaUpload) -> Result<String, SouqError>;
}
