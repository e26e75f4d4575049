//! Backup export.
//!
//! An export is every decryptable record in plain JSON:
//! `{ exportDate, appVersion, journals, tasks, events }`. It can be written
//! as-is or sealed with an age passphrase.
//!
//! Note: age uses scrypt for passphrase recipients, so a sealed export is
//! protected independently of the vault's own PBKDF2 credentials.

use std::io::{Read, Write};
use std::iter;
use std::path::Path;

use age::secrecy::SecretString;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use crate::error::{ChieError, Result};
use crate::fs::write_atomic;
use crate::storage::{Event, Journal, RecordStore, StorageBackend, Task};
use crate::vault::CredentialVault;
use crate::VERSION;

/// File name prefix for backups.
pub const BACKUP_PREFIX: &str = "Chie_Backup_";

/// Plaintext backup of all collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub export_date: DateTime<Utc>,
    pub app_version: String,
    pub journals: Vec<Journal>,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
}

impl ExportBundle {
    /// Total number of records in the bundle.
    pub fn record_count(&self) -> usize {
        self.journals.len() + self.tasks.len() + self.events.len()
    }

    /// Pretty-printed JSON, zeroized on drop.
    pub fn to_json(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(serde_json::to_vec_pretty(self)?))
    }

    /// Write the bundle as plain JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_json()?)?;
        info!(records = self.record_count(), "wrote backup to {}", path.display());
        Ok(())
    }

    /// Write the bundle sealed under an age passphrase.
    pub fn write_sealed(&self, path: &Path, passphrase: &str) -> Result<()> {
        let sealed = seal_with_passphrase(&self.to_json()?, passphrase)?;
        write_atomic(path, &sealed)?;
        info!(
            records = self.record_count(),
            "wrote sealed backup to {}",
            path.display()
        );
        Ok(())
    }

    /// Read a bundle written by [`ExportBundle::write_sealed`].
    pub fn read_sealed(path: &Path, passphrase: &str) -> Result<Self> {
        let sealed = std::fs::read(path)?;
        let json = open_with_passphrase(&sealed, passphrase)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Decrypt every collection into one bundle.
pub fn export_all<B: StorageBackend>(vault: &CredentialVault<B>) -> Result<ExportBundle> {
    let journals = RecordStore::<B, Journal>::new(vault).load_all()?;
    let tasks = RecordStore::<B, Task>::new(vault).load_all()?;
    let events = RecordStore::<B, Event>::new(vault).load_all()?;

    Ok(ExportBundle {
        export_date: Utc::now(),
        app_version: format!("Chie {}", VERSION),
        journals,
        tasks,
        events,
    })
}

/// `Chie_Backup_YYYY-MM-DD.json`
pub fn default_file_name(date: NaiveDate) -> String {
    format!("{}{}.json", BACKUP_PREFIX, date.format("%Y-%m-%d"))
}

/// Encrypt `data` with age passphrase encryption.
pub fn seal_with_passphrase(data: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::from(passphrase.to_string()));

    let mut sealed = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut sealed)
        .map_err(|e| ChieError::Crypto(format!("Failed to create encryptor: {}", e)))?;
    writer
        .write_all(data)
        .map_err(|e| ChieError::Crypto(format!("Encryption write failed: {}", e)))?;
    writer
        .finish()
        .map_err(|e| ChieError::Crypto(format!("Encryption finish failed: {}", e)))?;

    Ok(sealed)
}

/// Decrypt data produced by [`seal_with_passphrase`].
///
/// # Errors
///
/// Returns `ChieError::AuthenticationFailure` for a wrong passphrase and
/// `ChieError::Crypto` for malformed input.
pub fn open_with_passphrase(sealed: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let decryptor = age::Decryptor::new(sealed)
        .map_err(|e| ChieError::Crypto(format!("Failed to create decryptor: {}", e)))?;

    let identity = age::scrypt::Identity::new(SecretString::from(passphrase.to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => ChieError::AuthenticationFailure,
            _ => ChieError::Crypto(format!("Decryption failed: {}", e)),
        })?;

    let mut plaintext = Zeroizing::new(Vec::new());
    reader
        .read_to_end(&mut plaintext)
        .map_err(|e| ChieError::Crypto(format!("Failed to read decrypted data: {}", e)))?;
    Ok(plaintext)
}
