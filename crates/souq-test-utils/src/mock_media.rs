// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording media store for tests.
//!
//! `MockMediaStore` keeps every upload in memory and returns URLs shaped like
//! the hosted bucket's public URLs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use souq_core::{BackendAdapter, HealthStatus, MediaStore, MediaUpload, SouqError};

/// Base of the URLs handed out by [`MockMediaStore`].
pub const MOCK_CDN: &str = "https://cdn.test/storage/v1/object/public/chat-media";

#[derive(Default)]
pub struct MockMediaStore {
    uploads: Mutex<Vec<MediaUpload>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload received so far, in order.
    pub async fn uploads(&self) -> Vec<MediaUpload> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl BackendAdapter for MockMediaStore {
    fn name(&self) -> &str {
        "mock-media"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, SouqError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SouqError> {
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, upload: &MediaUpload) -> Result<String, SouqError> {
        let mut uploads = self.uploads.lock().await;
        let url = format!(
            "{MOCK_CDN}/{}/{}/{}.{}",
            upload.user_id,
            upload.folder,
            uploads.len(),
            upload.extension()
        );
        uploads.push(upload.clone());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uploads_are_recorded_in_order() {
        let store = MockMediaStore::new();
        let upload = MediaUpload {
            user_id: "c1".into(),
            folder: "chat".into(),
            file_name: "a.mp4".into(),
            content_type: "video/mp4".into(),
            bytes: vec![1],
        };
        let first = store.upload(&upload).await.unwrap();
        let second = store.upload(&upload).await.unwrap();
        assert_eq!(first, format!("{MOCK_CDN}/c1/chat/0.mp4"));
        assert!(second.ends_with("/1.mp4"));
        assert_eq!(store.uploads().await.len(), 2);
    }
}
