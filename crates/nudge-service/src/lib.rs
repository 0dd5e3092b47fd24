// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push notification pipeline for the nudge extension.
//!
//! A push flows through [`PushDecryptor`] and [`PayloadCodec`] (when it is
//! encrypted), then [`NotificationContentBuilder`] and
//! [`UnreadBadgeAggregator`], and is handed back to the host through a
//! one-shot content handler by [`NotificationService`].

pub mod accounts;
pub mod badge;
pub mod codec;
pub mod content;
pub mod decryptor;
pub mod service;

pub use accounts::ActiveAccountResolver;
pub use badge::{KnownUnreadThreads, UnreadBadgeAggregator};
pub use codec::{Payload, PayloadCodec};
pub use content::{BuiltNotification, MessageDetails, NotificationContentBuilder};
pub use decryptor::{EncryptedPush, PushDecryptor, encrypt_push};
pub use service::{
    ContentHandler, FallbackReason, NotificationService, Outcome, Processed, ServiceSettings,
};
