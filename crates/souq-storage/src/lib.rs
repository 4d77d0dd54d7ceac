// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local persistence backend for the Souq support chat.
//!
//! Every collection is a JSON blob under a fixed key in a single SQLite
//! table, mirroring the storefront's browser storage layout. The
//! [`LocalStore`] adapter implements the chat, account, and media traits on
//! top of it.

pub mod adapter;
pub mod database;
pub mod keys;
pub mod migrations;
pub mod queries;

pub use adapter::LocalStore;
pub use database::Database;
