// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential handling for the nudge push extension.
//!
//! [`crypto`] wraps ring's AES-256-GCM for push bodies; [`store`] is the
//! SQLite credential store holding per-account push keys and activity records.

pub mod crypto;
pub mod store;

pub use store::SqliteCredentialStore;
