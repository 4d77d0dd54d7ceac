// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted backend for the Souq support chat.
//!
//! Talks to a PostgREST-style table API and an object-storage bucket over
//! HTTPS. [`HostedStore`] implements the same repository traits as the local
//! backend, so feature logic never branches on the backend in use.

pub mod adapter;
pub mod client;

pub use adapter::HostedStore;
pub use client::HostedClient;
