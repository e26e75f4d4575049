//! Credential vault.
//!
//! Owns the master key. Two wraps of the same key are persisted through the
//! storage backend: one under the password, one under the recovery phrase.
//! While unlocked the key lives only in this struct; record stores borrow it.

mod wrap;

pub use wrap::{CredentialSlot, CredentialWrap, MasterKey};

use tracing::{debug, info, warn};

use crate::crypto::{normalize_phrase, validate_password, verifier_hash, verifier_matches};
use crate::crypto::RecoveryPhrase;
use crate::error::{ChieError, Result};
use crate::storage::StorageBackend;

/// Password and recovery credential management over a storage backend.
pub struct CredentialVault<B: StorageBackend> {
    backend: B,
    master_key: Option<MasterKey>,
    onboarding: Option<RecoveryPhrase>,
}

impl<B: StorageBackend> CredentialVault<B> {
    /// Wrap a backend. The vault starts locked.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_key: None,
            onboarding: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether a password wrap has been persisted. A damaged wrap still counts.
    pub fn is_configured(&self) -> Result<bool> {
        self.slot_present(CredentialSlot::Password)
    }

    /// Whether a recovery wrap has been persisted. A damaged wrap still counts.
    pub fn has_recovery(&self) -> Result<bool> {
        self.slot_present(CredentialSlot::Recovery)
    }

    fn slot_present(&self, slot: CredentialSlot) -> Result<bool> {
        match self.backend.load_credential(slot) {
            Ok(wrap) => Ok(wrap.is_some()),
            Err(ChieError::MalformedRow(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Load a wrap for unlocking. A damaged wrap reads as absent so the
    /// attempt fails like a wrong secret.
    fn wrap_for_unlock(&self, slot: CredentialSlot) -> Result<Option<CredentialWrap>> {
        match self.backend.load_credential(slot) {
            Err(ChieError::MalformedRow(reason)) => {
                warn!(slot = slot.key(), "stored credential is malformed: {}", reason);
                Ok(None)
            }
            other => other,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.master_key.is_some()
    }

    /// First-time setup: create the master key and its password wrap.
    ///
    /// Leaves the vault unlocked and returns a copy of the new master key so the
    /// caller can hand it to [`CredentialVault::setup_recovery`].
    ///
    /// # Errors
    ///
    /// - `ChieError::WeakSecret` if the password is shorter than the minimum
    /// - `ChieError::AlreadyConfigured` if a password wrap already exists
    pub fn setup_password(&mut self, password: &str) -> Result<MasterKey> {
        validate_password(password)?;
        if self.is_configured()? {
            return Err(ChieError::AlreadyConfigured);
        }

        let master_key = MasterKey::generate();
        let wrap = CredentialWrap::wrap(password, &master_key, Some(verifier_hash(password)))?;
        self.backend
            .store_credential(CredentialSlot::Password, &wrap)?;

        info!("vault configured with password");
        self.master_key = Some(master_key.clone());
        Ok(master_key)
    }

    /// Persist a recovery wrap of `master_key` under `phrase`.
    ///
    /// The phrase is normalized first, so verification later is case and
    /// surrounding-whitespace insensitive.
    pub fn setup_recovery(&self, phrase: &str, master_key: &MasterKey) -> Result<()> {
        let normalized = normalize_phrase(phrase);
        let wrap = CredentialWrap::wrap(&normalized, master_key, None)?;
        self.backend
            .store_credential(CredentialSlot::Recovery, &wrap)?;
        info!("recovery credential stored");
        Ok(())
    }

    /// Generate the recovery phrase to show the user during setup.
    ///
    /// The phrase is held until [`CredentialVault::finish_onboarding`] or
    /// [`CredentialVault::lock`]. Calling this again replaces it.
    pub fn begin_onboarding(&mut self) -> &RecoveryPhrase {
        self.onboarding.insert(RecoveryPhrase::generate())
    }

    /// Check the re-typed phrase against the pending one and store its wrap.
    ///
    /// # Errors
    ///
    /// - `ChieError::InvalidInput` if no onboarding is in progress
    /// - `ChieError::RecoveryMismatch` if the confirmation differs; the phrase
    ///   stays pending so the user can retry
    pub fn finish_onboarding(&mut self, confirmation: &str, master_key: &MasterKey) -> Result<()> {
        let phrase = self.onboarding.take().ok_or_else(|| {
            ChieError::InvalidInput("No recovery phrase is pending".to_string())
        })?;

        if !phrase.matches(confirmation) {
            self.onboarding = Some(phrase);
            return Err(ChieError::RecoveryMismatch);
        }

        self.setup_recovery(phrase.expose(), master_key)
    }

    /// Try to unlock with the password.
    ///
    /// Returns `Ok(false)` for a missing wrap, a wrong password, or a damaged
    /// wrap, without distinguishing them. Any resident key is dropped before
    /// the attempt, so a failed unlock always leaves the vault locked.
    pub fn unlock_with_password(&mut self, password: &str) -> Result<bool> {
        self.drop_key();
        let Some(wrap) = self.wrap_for_unlock(CredentialSlot::Password)? else {
            debug!("password unlock attempted on unconfigured vault");
            return Ok(false);
        };

        if let Some(stored) = &wrap.verifier_hash {
            if !verifier_matches(stored, &verifier_hash(password)) {
                warn!("password unlock rejected");
                return Ok(false);
            }
        }

        Ok(self.finish_unlock(&wrap, password, "password"))
    }

    /// Try to unlock with the recovery phrase.
    ///
    /// Same reporting rules as [`CredentialVault::unlock_with_password`].
    pub fn unlock_with_recovery(&mut self, phrase: &str) -> Result<bool> {
        self.drop_key();
        let Some(wrap) = self.wrap_for_unlock(CredentialSlot::Recovery)? else {
            debug!("recovery unlock attempted without a recovery credential");
            return Ok(false);
        };

        let normalized = normalize_phrase(phrase);
        Ok(self.finish_unlock(&wrap, &normalized, "recovery phrase"))
    }

    fn finish_unlock(&mut self, wrap: &CredentialWrap, secret: &str, method: &str) -> bool {
        match wrap.unwrap(secret) {
            Ok(master_key) => {
                self.master_key = Some(master_key);
                info!("vault unlocked with {}", method);
                true
            }
            Err(_) => {
                warn!("{} unlock rejected", method);
                false
            }
        }
    }

    /// Drop the master key and any pending onboarding phrase.
    pub fn lock(&mut self) {
        self.drop_key();
        self.onboarding = None;
    }

    fn drop_key(&mut self) {
        if self.master_key.take().is_some() {
            info!("vault locked");
        }
    }

    /// The resident master key.
    ///
    /// # Errors
    ///
    /// Returns `ChieError::VaultLocked` if the vault is locked.
    pub fn master_key(&self) -> Result<&MasterKey> {
        self.master_key.as_ref().ok_or(ChieError::VaultLocked)
    }
}
