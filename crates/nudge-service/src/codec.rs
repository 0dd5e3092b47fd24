// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decrypted push payload decoding.

use nudge_core::{BareJid, MessageKind, NudgeError};
use serde::{Deserialize, Serialize};

/// A chat message carried inside an encrypted push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Bare identity of the author (user or room). Resources are dropped.
    pub sender: BareJid,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Present when the user was mentioned in a room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub message: String,
}

/// JSON codec for [`Payload`].
pub struct PayloadCodec;

impl PayloadCodec {
    /// Decode a UTF-8 JSON document. Unknown fields are ignored.
    pub fn decode(plaintext: &[u8]) -> Result<Payload, NudgeError> {
        serde_json::from_slice(plaintext).map_err(|e| NudgeError::Decode(e.to_string()))
    }

    pub fn encode(payload: &Payload) -> Result<Vec<u8>, NudgeError> {
        serde_json::to_vec(payload).map_err(|e| NudgeError::Internal(e.to_string()))
    }
}
