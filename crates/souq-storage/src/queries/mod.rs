// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules over the key/value table.

pub mod collections;
pub mod kv;
