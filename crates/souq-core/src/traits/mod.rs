// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository trait definitions implemented by the local and hosted backends.
//!
//! All repositories extend [`BackendAdapter`] and use `#[async_trait]` so
//! they can be held as `Arc<dyn ...>` and chosen at runtime.

pub mod accounts;
pub mod adapter;
pub mod chat;
pub mod media;

pub use accounts::AccountRepository;
pub use adapter::BackendAdapter;
pub use chat::{ChatRepository, SessionUpdate};
pub use media::MediaStore;
