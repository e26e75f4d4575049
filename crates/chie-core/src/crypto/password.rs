//! Password rules and the fast-reject verifier.
//!
//! The verifier is a plain SHA-256 digest of the password stored next to the
//! password wrap. It is never used as key material; it only lets an unlock
//! attempt reject a wrong password before paying for key derivation.

use sha2::{Digest, Sha256};

use crate::error::{ChieError, Result};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Length of the verifier digest in bytes.
pub const VERIFIER_LENGTH: usize = 32;

/// Validate that a password meets the minimum length at setup time.
///
/// # Examples
///
/// ```
/// use chie_core::crypto::validate_password;
///
/// assert!(validate_password("correcthorse").is_ok());
/// assert!(validate_password("short").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    let actual = password.chars().count();
    if actual < MIN_PASSWORD_LENGTH {
        return Err(ChieError::WeakSecret {
            min: MIN_PASSWORD_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Compute the verifier digest of a password.
pub fn verifier_hash(password: &str) -> [u8; VERIFIER_LENGTH] {
    Sha256::digest(password.as_bytes()).into()
}

/// Compare a candidate digest against the stored one without early exit.
pub fn verifier_matches(stored: &[u8; VERIFIER_LENGTH], candidate: &[u8; VERIFIER_LENGTH]) -> bool {
    stored
        .iter()
        .zip(candidate.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
