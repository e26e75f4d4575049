//! Storage backend trait definition.
//!
//! The `StorageBackend` trait is the durable half of Chie: opaque envelope
//! rows for the three record collections, the two credential wraps, and a
//! small key/value `meta` table. Backends never see plaintext records and
//! never hold keys; encryption happens above this layer.

use crate::crypto::Envelope;
use crate::error::Result;
use crate::vault::{CredentialSlot, CredentialWrap};

use super::types::{Collection, RowId, StoredRow};

/// Durable storage for encrypted Chie data.
///
/// All implementations must ensure:
/// - Row ids are assigned by the backend and never reused within a collection
/// - Rows are returned in insertion (row id) order
/// - Credential wraps are written once and never overwritten
pub trait StorageBackend: Send + Sync {
    // --- Credential settings ---

    /// Load the credential wrap stored under `slot`, if any.
    ///
    /// A wrap whose columns have the wrong shape is `ChieError::MalformedRow`.
    fn load_credential(&self, slot: CredentialSlot) -> Result<Option<CredentialWrap>>;

    /// Persist a credential wrap.
    ///
    /// # Errors
    ///
    /// Returns `ChieError::AlreadyConfigured` if the slot is already populated.
    fn store_credential(&self, slot: CredentialSlot, wrap: &CredentialWrap) -> Result<()>;

    // --- Metadata ---

    /// Read a metadata value.
    fn meta(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a metadata value.
    fn set_meta(&self, key: &str, value: &str) -> Result<()>;

    // --- Encrypted collections ---

    /// Append one opaque row, returning its backend-assigned id.
    fn insert_row(&self, collection: Collection, envelope: &Envelope) -> Result<RowId>;

    /// Read every well-formed row of a collection in row id order.
    ///
    /// Rows whose columns cannot form an envelope are left out, so one bad
    /// row never hides the rest.
    fn rows(&self, collection: Collection) -> Result<Vec<StoredRow>>;

    /// Overwrite the envelope of an existing row.
    ///
    /// Returns `false` if the row no longer exists.
    fn replace_row(&self, collection: Collection, row_id: RowId, envelope: &Envelope)
        -> Result<bool>;

    /// Delete rows by id, returning how many were removed.
    fn delete_rows(&self, collection: Collection, row_ids: &[RowId]) -> Result<usize>;

    /// Number of rows in a collection.
    fn count_rows(&self, collection: Collection) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn(_backend: &dyn StorageBackend) {}
    }
}
