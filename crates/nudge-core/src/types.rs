// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the collaborator traits and the push pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;
use zeroize::Zeroizing;

use crate::error::NudgeError;
use crate::jid::BareJid;

/// Push metadata keys understood by the extension.
pub mod keys {
    pub const ACCOUNT: &str = "account";
    pub const ENCRYPTED: &str = "encrypted";
    pub const IV: &str = "iv";
    pub const SENDER: &str = "sender";
    pub const BODY: &str = "body";
    pub const NICKNAME: &str = "nickname";
    pub const UNREAD_MESSAGES: &str = "unread-messages";
}

/// Kind of conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum MessageKind {
    /// One-to-one chat.
    #[serde(rename = "chat")]
    #[strum(serialize = "chat")]
    Direct,
    /// Multi-user chat room.
    #[serde(rename = "groupchat")]
    #[strum(serialize = "groupchat")]
    GroupChat,
    /// Anything else, including plain pushes that carry no kind at all.
    #[serde(rename = "unknown", other)]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl MessageKind {
    /// Map the stored conversation type column (0 = roster/direct, otherwise group).
    pub fn from_stored(code: i64) -> Self {
        if code == 0 {
            Self::Direct
        } else {
            Self::GroupChat
        }
    }
}

/// Opaque thread identifier used for unread tracking and notification grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single conversation: one account talking to one peer (user or room).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId {
    pub account: BareJid,
    pub peer: BareJid,
}

impl ConversationId {
    pub fn new(account: BareJid, peer: BareJid) -> Self {
        Self { account, peer }
    }

    /// Encoded form: `account=<account>|sender=<peer>`.
    pub fn thread_id(&self) -> ThreadId {
        ThreadId(format!("account={}|sender={}", self.account, self.peer))
    }
}

/// Display metadata for a conversation as stored by the chat application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationInfo {
    pub name: Option<String>,
    pub kind: MessageKind,
}

/// Per-account activity flag persisted by the chat application.
///
/// Stored as a small versioned JSON document. Anything that fails to decode
/// is treated by callers as an inactive account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub version: u32,
    #[serde(default)]
    pub active: bool,
}

impl AccountRecord {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(active: bool) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            active,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, NudgeError> {
        let record: Self = serde_json::from_slice(bytes)
            .map_err(|e| NudgeError::Deserialization(format!("account record: {e}")))?;
        if record.version != Self::CURRENT_VERSION {
            return Err(NudgeError::Deserialization(format!(
                "unsupported account record version {}",
                record.version
            )));
        }
        Ok(record)
    }

    pub fn encode(&self) -> Vec<u8> {
        // Serializing two plain fields cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// A 256-bit push notification key. Zeroed on drop; never printed.
#[derive(Clone)]
pub struct PushKey(Zeroizing<[u8; 32]>);

impl PushKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Build a key from a byte slice, rejecting anything that is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NudgeError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            NudgeError::Decrypt(format!("push key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::new(array))
    }

    pub fn expose(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PushKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushKey([REDACTED])")
    }
}

/// Mutable notification content.
///
/// Starts life as a copy of the incoming request content and is refined by the
/// pipeline. `user_info` carries the raw push metadata on the way in and the
/// correlation metadata (`account`, `sender`) on the way out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    /// Play the default notification sound.
    pub sound: bool,
    pub thread_id: Option<String>,
    pub badge: Option<usize>,
    pub user_info: BTreeMap<String, serde_json::Value>,
}

impl NotificationContent {
    /// String value of a metadata key, if present and a string.
    pub fn user_info_str(&self, key: &str) -> Option<&str> {
        self.user_info.get(key).and_then(serde_json::Value::as_str)
    }

    /// Integer value of a metadata key. Numeric strings are accepted too.
    pub fn user_info_i64(&self, key: &str) -> Option<i64> {
        match self.user_info.get(key)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// A push as handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    #[serde(default)]
    pub identifier: String,
    pub content: NotificationContent,
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}
