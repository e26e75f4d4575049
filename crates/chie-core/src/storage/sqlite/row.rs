//! Raw row types for settings and collection queries.

use crate::crypto::envelope::NONCE_LENGTH;
use crate::crypto::password::VERIFIER_LENGTH;
use crate::crypto::{Envelope, SALT_LENGTH};
use crate::error::{ChieError, Result};
use crate::storage::types::{RowId, StoredRow};
use crate::vault::CredentialWrap;

/// Raw row data from the settings table, before parsing into a wrap.
#[derive(Debug)]
pub struct SettingsRow {
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub wrapped_key: Vec<u8>,
    pub verifier_hash: Option<Vec<u8>>,
}

fn fixed<const N: usize>(bytes: &[u8], field: &str) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        ChieError::MalformedRow(format!(
            "Invalid {} length: expected {}, got {}",
            field,
            N,
            bytes.len()
        ))
    })
}

impl TryFrom<SettingsRow> for CredentialWrap {
    type Error = ChieError;

    fn try_from(row: SettingsRow) -> Result<Self> {
        let salt = fixed::<SALT_LENGTH>(&row.salt, "salt")?;
        let iv = fixed::<NONCE_LENGTH>(&row.iv, "iv")?;
        let verifier_hash = row
            .verifier_hash
            .as_deref()
            .map(|bytes| fixed::<VERIFIER_LENGTH>(bytes, "verifier hash"))
            .transpose()?;

        Ok(CredentialWrap {
            salt,
            iv,
            wrapped_key: row.wrapped_key,
            verifier_hash,
        })
    }
}

/// Raw row data from a collection table.
#[derive(Debug)]
pub struct EnvelopeRow {
    pub id: RowId,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl TryFrom<EnvelopeRow> for StoredRow {
    type Error = ChieError;

    fn try_from(row: EnvelopeRow) -> Result<Self> {
        let nonce = fixed::<NONCE_LENGTH>(&row.nonce, "nonce")?;
        Ok(StoredRow {
            row_id: row.id,
            envelope: Envelope {
                nonce,
                ciphertext: row.ciphertext,
            },
        })
    }
}
