// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Souq integration tests.
//!
//! Provides a harness over a temp-dir local backend and a recording media
//! store, so tests run without network access.
//!
//! # Components
//!
//! - [`TestHarness`] - fully wired services over a throwaway database
//! - [`MockMediaStore`] - media store that records uploads and returns CDN-style URLs

pub mod harness;
pub mod mock_media;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_media::MockMediaStore;
