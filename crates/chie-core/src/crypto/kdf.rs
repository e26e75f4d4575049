//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Credentials (the password and the recovery phrase) are stretched into
//! AES-256-GCM keys that wrap the master key. The iteration count is the
//! deliberate work factor against offline guessing, so derived keys are never
//! cached; every unlock attempt pays it again.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::envelope::SymmetricKey;
use crate::error::{ChieError, Result};

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// Length of a credential salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// A cryptographic key derived from a credential.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl SymmetricKey for DerivedKey {
    fn key_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Generate a fresh random salt for one credential wrap.
pub fn random_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from a credential and salt.
///
/// Same secret + salt always yields the same key bytes, which is what lets
/// an unlock re-derive the key that wrapped the master key at setup.
///
/// # Examples
///
/// ```
/// use chie_core::crypto::derive_key;
///
/// let salt = [7u8; 16];
/// let key = derive_key("correcthorse", &salt).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(secret: &str, salt: &[u8; SALT_LENGTH]) -> Result<DerivedKey> {
    if secret.is_empty() {
        return Err(ChieError::InvalidInput(
            "Secret cannot be empty".to_string(),
        ));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key_bytes);

    Ok(DerivedKey::from_bytes(key_bytes))
}
