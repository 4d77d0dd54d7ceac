// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted table and storage APIs.
//!
//! Provides [`HostedClient`] which handles authentication headers, filter
//! encoding, and mapping of HTTP failures onto [`SouqError`]. There is no
//! retry: a failed request surfaces immediately.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use souq_config::model::HostedBackendConfig;
use souq_core::SouqError;
use tracing::debug;

/// A `column=op.value` row filter, e.g. `("customer_id", "eq.c1")`.
pub type Filter = (&'static str, String);

/// Equality filter on `column`.
pub fn eq(column: &'static str, value: impl std::fmt::Display) -> Filter {
    (column, format!("eq.{value}"))
}

/// HTTP client for the hosted backend.
#[derive(Debug, Clone)]
pub struct HostedClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    timeout: Duration,
}

impl HostedClient {
    /// Builds a client from the `[backend.hosted]` configuration section.
    ///
    /// Fails with [`SouqError::Config`] when the base URL or API key is missing.
    pub fn new(config: &HostedBackendConfig) -> Result<Self, SouqError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| SouqError::Config("backend.hosted.base_url is not set".into()))?
            .trim_end_matches('/')
            .to_string();
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| SouqError::Config("backend.hosted.api_key is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| SouqError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| SouqError::Config(format!("invalid API key header value: {e}")))?,
        );

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SouqError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            bucket: config.bucket.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public URL of an object previously stored with [`Self::upload_object`].
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }

    fn table_url(&self, table: &str, params: &[Filter]) -> Result<Url, SouqError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{table}", self.base_url)).map_err(|e| {
            SouqError::Config(format!("invalid hosted base URL {}: {e}", self.base_url))
        })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// `GET` rows of `table` matching `params` (filters, `order`, `limit`).
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[Filter],
    ) -> Result<Vec<T>, SouqError> {
        let url = self.table_url(table, params)?;
        let request = self.client.get(url);
        self.send_json(request, table).await
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<Vec<T>, SouqError> {
        let url = self.table_url(table, &[])?;
        let request = self
            .client
            .post(url)
            .header("prefer", "return=representation")
            .json(row);
        self.send_json(request, table).await
    }

    /// Insert or merge one row keyed on `on_conflict`.
    pub async fn upsert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
        on_conflict: &'static str,
    ) -> Result<Vec<T>, SouqError> {
        let url = self.table_url(table, &[("on_conflict", on_conflict.to_string())])?;
        let request = self
            .client
            .post(url)
            .header("prefer", "resolution=merge-duplicates,return=representation")
            .json(row);
        self.send_json(request, table).await
    }

    /// `PATCH` rows matching `filters`; returns the updated rows.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &B,
    ) -> Result<Vec<T>, SouqError> {
        let url = self.table_url(table, filters)?;
        let request = self
            .client
            .request(Method::PATCH, url)
            .header("prefer", "return=representation")
            .json(patch);
        self.send_json(request, table).await
    }

    /// Delete rows matching `filters`.
    pub async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), SouqError> {
        let url = self.table_url(table, filters)?;
        let request = self.client.delete(url);
        self.send(request, table).await.map(|_| ())
    }

    /// Store `bytes` at `path` in the configured bucket. An existing object is
    /// never replaced; the API rejects the upload instead.
    pub async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SouqError> {
        let url = format!(
            "{}/storage/v1/object/{}/{path}",
            self.base_url, self.bucket
        );
        let request = self
            .client
            .post(url)
            .header("content-type", content_type)
            .body(bytes);
        self.send(request, &self.bucket).await.map(|_| ())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        target: &str,
    ) -> Result<reqwest::Response, SouqError> {
        let response = request.send().await.map_err(|e| self.map_request_err(e))?;
        let status = response.status();
        debug!(status = %status, target, "hosted response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, target, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: &str,
    ) -> Result<Vec<T>, SouqError> {
        let response = self.send(request, target).await?;
        let body = response.text().await.map_err(|e| self.map_request_err(e))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body).map_err(|e| SouqError::Backend {
            message: format!("failed to parse {target} response: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })
    }

    fn map_request_err(&self, e: reqwest::Error) -> SouqError {
        if e.is_timeout() {
            return SouqError::Timeout {
                duration: self.timeout,
            };
        }
        SouqError::Backend {
            message: format!("HTTP request failed: {e}"),
            status: e.status().map(|s| s.as_u16()),
            source: Some(Box::new(e)),
        }
    }
}

/// Error for a non-success response, preferring the API's own `message` field.
fn status_error(status: StatusCode, target: &str, body: &str) -> SouqError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    SouqError::Backend {
        message: format!("{target} returned {status}: {detail}"),
        status: Some(status.as_u16()),
        source: None,
    }
}
