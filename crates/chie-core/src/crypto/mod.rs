//! Cryptographic operations for Chie.
//!
//! - **PBKDF2-HMAC-SHA256**: stretches a password or recovery phrase into a
//!   wrapping key (`kdf`)
//! - **AES-256-GCM**: authenticated envelopes for every stored record and for
//!   the wrapped master key (`envelope`)
//! - Password rules and the fast-reject verifier (`password`)
//! - Recovery phrase generation and normalization (`phrase`)
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the database file
//! - Offline guessing of the password or recovery phrase
//! - Tampering with stored records
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Code running inside the unlocked process

pub mod envelope;
pub mod kdf;
pub mod password;
pub mod phrase;

pub use envelope::{decrypt_record, encrypt_record, open, seal, Envelope, SymmetricKey};
pub use kdf::{derive_key, random_salt, DerivedKey, KEY_LENGTH, SALT_LENGTH};
pub use password::{validate_password, verifier_hash, verifier_matches, MIN_PASSWORD_LENGTH};
pub use phrase::{normalize_phrase, recovery_artifact, RecoveryPhrase};
