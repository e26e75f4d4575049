//! AES-256-GCM envelopes.
//!
//! An [`Envelope`] is the self-contained result of encrypting one payload:
//! the 96-bit nonce travels with the ciphertext (which carries the 16-byte GCM
//! tag), so the key is the only other input needed to open it. Nonces come
//! from the operating system RNG on every call and are never derived from
//! content or counters.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::kdf::KEY_LENGTH;
use crate::error::{ChieError, Result};

/// Nonce length in bytes (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Anything that can key the envelope cipher.
pub trait SymmetricKey {
    fn key_bytes(&self) -> &[u8; KEY_LENGTH];
}

/// Nonce plus authenticated ciphertext for one payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub nonce: [u8; NONCE_LENGTH],
    /// Ciphertext with the GCM tag appended.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Compact byte form: `nonce || ciphertext+tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LENGTH + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the compact byte form produced by [`Envelope::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(ChieError::Decryption(format!(
                "envelope too short ({} bytes)",
                bytes.len()
            )));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LENGTH);
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(nonce_bytes);
        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

fn cipher(key: &impl SymmetricKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.key_bytes())
        .map_err(|e| ChieError::Crypto(format!("Invalid key length: {}", e)))
}

/// Encrypt raw bytes under `key` with a fresh random nonce.
pub fn seal(key: &impl SymmetricKey, plaintext: &[u8]) -> Result<Envelope> {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher(key)?
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| ChieError::Crypto("Encryption failed".to_string()))?;

    Ok(Envelope { nonce, ciphertext })
}

/// Decrypt and authenticate an envelope.
///
/// # Errors
///
/// Returns `ChieError::Decryption` when the key is wrong or any byte of the
/// nonce or ciphertext was altered.
pub fn open(key: &impl SymmetricKey, envelope: &Envelope) -> Result<Zeroizing<Vec<u8>>> {
    cipher(key)?
        .decrypt(
            Nonce::from_slice(&envelope.nonce),
            envelope.ciphertext.as_slice(),
        )
        .map(Zeroizing::new)
        .map_err(|_| {
            ChieError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })
}

/// Serialize a record to UTF-8 JSON and encrypt it.
pub fn encrypt_record<T: Serialize>(key: &impl SymmetricKey, record: &T) -> Result<Envelope> {
    let plaintext = Zeroizing::new(serde_json::to_vec(record)?);
    seal(key, &plaintext)
}

/// Decrypt an envelope and deserialize the JSON record inside.
pub fn decrypt_record<T: DeserializeOwned>(key: &impl SymmetricKey, envelope: &Envelope) -> Result<T> {
    let plaintext = open(key, envelope)?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| ChieError::Decryption(format!("record payload is not valid: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::DerivedKey;
    use std::collections::HashSet;

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; KEY_LENGTH])
    }

    #[test]
    fn test_record_round_trip() {
        let record = serde_json::json!({"id": 7, "title": "T", "content": "hello"});
        let envelope = encrypt_record(&key(1), &record).unwrap();
        let decrypted: serde_json::Value = decrypt_record(&key(1), &envelope).unwrap();
        assert_eq!(decrypted, record);
    }

    #[test]
    fn test_ciphertext_carries_tag() {
        let envelope = seal(&key(1), b"abc").unwrap();
        assert_eq!(envelope.ciphertext.len(), 3 + TAG_LENGTH);
    }

    #[test]
    fn test_wrong_key_fails() {
        let envelope = encrypt_record(&key(1), &"secret").unwrap();
        let result: Result<String> = decrypt_record(&key(2), &envelope);
        assert!(matches!(result, Err(ChieError::Decryption(_))));
    }

    #[test]
    fn test_nonces_are_unique() {
        let key = key(5);
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let envelope = seal(&key, b"x").unwrap();
            assert!(seen.insert(envelope.nonce));
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn test_any_flipped_byte_is_detected() {
        let key = key(9);
        let envelope = encrypt_record(&key, &serde_json::json!({"content": "hello"})).unwrap();

        for i in 0..envelope.ciphertext.len() {
            let mut tampered = envelope.clone();
            tampered.ciphertext[i] ^= 0x01;
            assert!(matches!(open(&key, &tampered), Err(ChieError::Decryption(_))));
        }
        for i in 0..NONCE_LENGTH {
            let mut tampered = envelope.clone();
            tampered.nonce[i] ^= 0x80;
            assert!(matches!(open(&key, &tampered), Err(ChieError::Decryption(_))));
        }
    }

    #[test]
    fn test_compact_bytes_round_trip() {
        let envelope = seal(&key(3), b"payload").unwrap();
        let parsed = Envelope::from_bytes(&envelope.to_bytes()).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(&*open(&key(3), &parsed).unwrap(), b"payload");
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let result = Envelope::from_bytes(&[0u8; NONCE_LENGTH + TAG_LENGTH - 1]);
        assert!(matches!(result, Err(ChieError::Decryption(_))));
    }

    #[test]
    fn test_valid_ciphertext_of_wrong_shape_is_decryption_error() {
        let envelope = encrypt_record(&key(4), &"just a string").unwrap();
        let result: Result<Vec<u32>> = decrypt_record(&key(4), &envelope);
        assert!(matches!(result, Err(ChieError::Decryption(_))));
    }
}
