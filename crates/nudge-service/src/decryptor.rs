// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM decryption of push bodies.
//!
//! The key is looked up per account; the nonce and the ciphertext (with the
//! 16-byte tag appended) arrive base64-encoded in the `iv` and `encrypted`
//! metadata fields. Every failure, from a missing key to a bad tag, is a
//! single [`NudgeError::Decrypt`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nudge_core::{BareJid, CredentialStore, NudgeError, PushKey};
use nudge_vault::crypto;
use tracing::debug;

/// Base64 fields of an encrypted push, as they appear in the metadata map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPush {
    pub encrypted: String,
    pub iv: String,
}

/// Decrypts push bodies with keys from the credential store.
pub struct PushDecryptor {
    credentials: Arc<dyn CredentialStore>,
}

impl PushDecryptor {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Decrypt raw bytes. Never returns partial output.
    pub fn decrypt(key: &PushKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NudgeError> {
        crypto::open(key.expose(), nonce, ciphertext)
    }

    /// Resolve the key of `account` and decrypt the base64 push fields.
    pub async fn decrypt_push(
        &self,
        account: &BareJid,
        push: &EncryptedPush,
    ) -> Result<Vec<u8>, NudgeError> {
        let key = match self.credentials.get_key(account).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                return Err(NudgeError::Decrypt(format!("no push key for {account}")));
            }
            Err(e) => return Err(NudgeError::Decrypt(format!("push key lookup failed: {e}"))),
        };

        let ciphertext = STANDARD
            .decode(push.encrypted.trim())
            .map_err(|e| NudgeError::Decrypt(format!("malformed ciphertext: {e}")))?;
        let nonce = STANDARD
            .decode(push.iv.trim())
            .map_err(|e| NudgeError::Decrypt(format!("malformed iv: {e}")))?;

        let plaintext = Self::decrypt(&key, &nonce, &ciphertext)?;
        debug!(%account, len = plaintext.len(), "push body decrypted");
        Ok(plaintext)
    }
}

/// Seal `plaintext` under `key` with a fresh nonce and base64-encode both parts.
pub fn encrypt_push(key: &PushKey, plaintext: &[u8]) -> Result<EncryptedPush, NudgeError> {
    let (ciphertext, nonce) = crypto::seal(key.expose(), plaintext)?;
    Ok(EncryptedPush {
        encrypted: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(nonce),
    })
}
