// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature logic for the Souq support chat.
//!
//! Everything here is written once against the repository traits and works
//! unchanged on the local and hosted backends.

pub mod accounts;
pub mod backend;
pub mod caption;
pub mod messages;
pub mod poller;
pub mod service;
pub mod sessions;

#[cfg(test)]
pub(crate) mod testing;

pub use accounts::AccountService;
pub use backend::{open_backend, Backend};
pub use caption::{caption_for, resolve_body};
pub use messages::MessageStore;
pub use poller::{ChatPoller, ChatSnapshot, PollScope};
pub use service::{Delivery, SupportService};
pub use sessions::SessionIndex;
