// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Nonces are 96 bits. [`seal`] draws a fresh nonce from the system CSPRNG on
//! every call; nonce reuse under one key would be catastrophic for GCM.

use nudge_core::NudgeError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// Length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

fn less_safe_key(key: &[u8; 32]) -> Result<LessSafeKey, NudgeError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| NudgeError::Decrypt("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a caller-chosen nonce.
///
/// Returns the ciphertext with the 16-byte tag appended.
pub fn seal_with_nonce(
    key: &[u8; 32],
    nonce_bytes: [u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, NudgeError> {
    let key = less_safe_key(key)?;
    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce_bytes), Aad::empty(), &mut in_out)
        .map_err(|_| NudgeError::Internal("AES-256-GCM encryption failed".to_string()))?;
    Ok(in_out)
}

/// Encrypt `plaintext` under `key` with a random nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), NudgeError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| NudgeError::Internal("failed to generate random nonce".to_string()))?;
    let ciphertext = seal_with_nonce(key, nonce_bytes, plaintext)?;
    Ok((ciphertext, nonce_bytes))
}

/// Decrypt and authenticate `ciphertext` (tag appended) with an empty AAD.
///
/// Any failure, including a nonce that is not 96 bits, is a
/// [`NudgeError::Decrypt`]. No partial plaintext is ever returned.
pub fn open(key: &[u8; 32], nonce_bytes: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NudgeError> {
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| {
        NudgeError::Decrypt(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce_bytes.len()
        ))
    })?;

    let key = less_safe_key(key)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| {
            NudgeError::Decrypt("authentication failed -- wrong key or tampered data".to_string())
        })?;

    Ok(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generate_random_key() -> Result<[u8; 32], NudgeError> {
        let mut key = [0u8; 32];
        SystemRandom::new()
            .fill(&mut key)
            .map_err(|_| NudgeError::Internal("failed to generate random key".to_string()))?;
        Ok(key)
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_random_key().unwrap();
        let plaintext = br#"{"sender":"bob@example.com","type":"chat","message":"hi"}"#;

        let (ciphertext, nonce) = seal(&key, plaintext).unwrap();
        let decrypted = open(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ciphertext_carries_tag() {
        let key = generate_random_key().unwrap();
        let (ciphertext, _) = seal(&key, b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let key1 = generate_random_key().unwrap();
        let key2 = generate_random_key().unwrap();

        let (ciphertext, nonce) = seal(&key1, b"secret data").unwrap();
        let result = open(&key2, &nonce, &ciphertext);

        assert!(matches!(result, Err(NudgeError::Decrypt(_))));
    }

    #[test]
    fn every_single_byte_tamper_is_detected() {
        let key = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key, b"do not tamper").unwrap();

        // Covers both the ciphertext body and the trailing tag.
        for i in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(open(&key, &nonce, &tampered), Err(NudgeError::Decrypt(_))),
                "tamper at byte {i} went unnoticed"
            );
        }
    }

    #[test]
    fn wrong_nonce_length_is_a_decrypt_error() {
        let key = generate_random_key().unwrap();
        let (ciphertext, _) = seal(&key, b"x").unwrap();
        assert!(matches!(
            open(&key, &[0u8; 16], &ciphertext),
            Err(NudgeError::Decrypt(_))
        ));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let key = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key, b"short").unwrap();
        assert!(open(&key, &nonce, &ciphertext[..TAG_LEN - 1]).is_err());
        assert!(open(&key, &nonce, &[]).is_err());
    }

    #[test]
    fn fixed_nonce_is_deterministic() {
        let key = [42u8; 32];
        let a = seal_with_nonce(&key, [1u8; NONCE_LEN], b"same").unwrap();
        let b = seal_with_nonce(&key, [1u8; NONCE_LEN], b"same").unwrap();
        assert_eq!(a, b);
        assert_eq!(open(&key, &[1u8; NONCE_LEN], &a).unwrap(), b"same");
    }

    proptest! {
        #[test]
        fn open_inverts_seal_for_any_input(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; NONCE_LEN]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let sealed = seal_with_nonce(&key, nonce, &plaintext).unwrap();
            prop_assert_eq!(sealed.len(), plaintext.len() + TAG_LEN);
            prop_assert_eq!(open(&key, &nonce, &sealed).unwrap(), plaintext);
        }

        #[test]
        fn any_flipped_bit_is_rejected(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; NONCE_LEN]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 1..64),
            position in any::<prop::sample::Index>(),
        ) {
            let mut sealed = seal_with_nonce(&key, nonce, &plaintext).unwrap();
            let i = position.index(sealed.len());
            sealed[i] ^= 0x80;
            prop_assert!(matches!(open(&key, &nonce, &sealed), Err(NudgeError::Decrypt(_))));
        }
    }
}
