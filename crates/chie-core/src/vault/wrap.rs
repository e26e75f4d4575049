//! Master key and credential wraps.
//!
//! The master key is random and never leaves memory in plaintext. Each
//! credential stores its own copy of it, sealed under a key derived from
//! that credential and a per-wrap salt.

use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretBox};

use crate::crypto::envelope::NONCE_LENGTH;
use crate::crypto::password::VERIFIER_LENGTH;
use crate::crypto::{derive_key, open, random_salt, seal, Envelope, SymmetricKey};
use crate::crypto::{KEY_LENGTH, SALT_LENGTH};
use crate::error::{ChieError, Result};

/// The random 256-bit key that encrypts every record.
pub struct MasterKey(SecretBox<[u8; KEY_LENGTH]>);

impl MasterKey {
    /// Fresh key from the operating system RNG.
    pub fn generate() -> Self {
        Self(SecretBox::init_with_mut(|bytes: &mut [u8; KEY_LENGTH]| {
            OsRng.fill_bytes(bytes)
        }))
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LENGTH {
            return Err(ChieError::AuthenticationFailure);
        }
        Ok(Self(SecretBox::init_with_mut(
            |key: &mut [u8; KEY_LENGTH]| key.copy_from_slice(bytes),
        )))
    }
}

impl Clone for MasterKey {
    fn clone(&self) -> Self {
        let source = self.0.expose_secret();
        Self(SecretBox::init_with_mut(|key: &mut [u8; KEY_LENGTH]| {
            key.copy_from_slice(source)
        }))
    }
}

impl SymmetricKey for MasterKey {
    fn key_bytes(&self) -> &[u8; KEY_LENGTH] {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Which credential a wrap belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    Password,
    Recovery,
}

impl CredentialSlot {
    /// Settings key the wrap is stored under.
    pub fn key(self) -> &'static str {
        match self {
            CredentialSlot::Password => "passwordData",
            CredentialSlot::Recovery => "recoveryData",
        }
    }
}

/// The master key sealed under one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialWrap {
    pub salt: [u8; SALT_LENGTH],
    pub iv: [u8; NONCE_LENGTH],
    pub wrapped_key: Vec<u8>,
    /// SHA-256 of the password; recovery wraps carry none.
    pub verifier_hash: Option<[u8; VERIFIER_LENGTH]>,
}

impl CredentialWrap {
    /// Seal `master_key` under a key derived from `secret` and a fresh salt.
    pub fn wrap(
        secret: &str,
        master_key: &MasterKey,
        verifier_hash: Option<[u8; VERIFIER_LENGTH]>,
    ) -> Result<Self> {
        let salt = random_salt();
        let wrapping_key = derive_key(secret, &salt)?;
        let envelope = seal(&wrapping_key, master_key.key_bytes())?;

        Ok(Self {
            salt,
            iv: envelope.nonce,
            wrapped_key: envelope.ciphertext,
            verifier_hash,
        })
    }

    /// Recover the master key with `secret`.
    ///
    /// # Errors
    ///
    /// Returns `ChieError::AuthenticationFailure` for a wrong secret and for a
    /// damaged wrap alike.
    pub fn unwrap(&self, secret: &str) -> Result<MasterKey> {
        let wrapping_key =
            derive_key(secret, &self.salt).map_err(|_| ChieError::AuthenticationFailure)?;
        let envelope = Envelope {
            nonce: self.iv,
            ciphertext: self.wrapped_key.clone(),
        };
        let plaintext =
            open(&wrapping_key, &envelope).map_err(|_| ChieError::AuthenticationFailure)?;
        MasterKey::from_slice(&plaintext)
    }
}
