// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bare JID identities for accounts and conversation peers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NudgeError;

/// A case-normalized, resource-free XMPP address (`local@domain` or `domain`).
///
/// Used both as the account identifier and as the peer half of a conversation
/// identifier. Ordering is plain byte ordering of the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BareJid(String);

impl BareJid {
    /// Parse and normalize a JID. Any `/resource` suffix is dropped.
    pub fn parse(input: &str) -> Result<Self, NudgeError> {
        let trimmed = input.trim();
        let bare = match trimmed.split_once('/') {
            Some((bare, _resource)) => bare,
            None => trimmed,
        };

        if bare.is_empty() || bare.chars().any(char::is_whitespace) {
            return Err(NudgeError::InvalidJid(input.to_string()));
        }

        let (local, domain) = match bare.split_once('@') {
            Some((local, domain)) => (Some(local), domain),
            None => (None, bare),
        };

        if domain.is_empty() || domain.contains('@') || local.is_some_and(str::is_empty) {
            return Err(NudgeError::InvalidJid(input.to_string()));
        }

        Ok(Self(bare.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for BareJid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BareJid {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BareJid {
    type Error = NudgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BareJid> for String {
    fn from(jid: BareJid) -> Self {
        jid.0
    }
}
