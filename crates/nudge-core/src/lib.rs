// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the nudge push extension.
//!
//! Provides the error type, identity and content types, and the collaborator
//! traits that the SQLite stores and the test mocks implement.

pub mod error;
pub mod jid;
pub mod traits;
pub mod types;

pub use error::NudgeError;
pub use jid::BareJid;
pub use types::{
    AccountRecord, ConversationId, ConversationInfo, HealthStatus, MessageKind,
    NotificationContent, PushKey, PushRequest, ThreadId,
};

pub use traits::{Collaborator, ConversationStore, CredentialStore};
