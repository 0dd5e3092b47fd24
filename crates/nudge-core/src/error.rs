// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the nudge push extension.

use thiserror::Error;

/// The primary error type used across collaborator traits and the push pipeline.
///
/// None of these escape the pipeline: every variant has a local fallback, and the
/// worst externally visible outcome is less personalized notification content.
#[derive(Debug, Error)]
pub enum NudgeError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Push body could not be decrypted: missing key, malformed base64, or a
    /// failed authentication tag. Deliberately a single category.
    #[error("decrypt error: {0}")]
    Decrypt(String),

    /// Decrypted push body is not a valid payload document.
    #[error("decode error: {0}")]
    Decode(String),

    /// Database or credential store unavailable, or a query against it failed.
    #[error("lookup failure: {message}")]
    Lookup {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A persisted record (e.g. an account activity record) is corrupt.
    #[error("deserialization failure: {0}")]
    Deserialization(String),

    /// Storage backend errors (connection, migration, pragma).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A string could not be parsed as a bare JID.
    #[error("invalid jid `{0}`")]
    InvalidJid(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NudgeError {
    /// Shorthand for a [`NudgeError::Lookup`] without an underlying source.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
            source: None,
        }
    }
}
