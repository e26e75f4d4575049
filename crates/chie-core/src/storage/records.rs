//! Encrypted record collections.
//!
//! A [`RecordStore`] borrows an unlocked vault and applies the envelope codec
//! to every record of one type. Rows are located by the record id sealed inside
//! them; an in-memory `id -> row` index, rebuilt on every full load, saves a
//! decrypt scan per mutation.

use std::collections::HashMap;
use std::marker::PhantomData;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::{decrypt_record, encrypt_record};
use crate::error::{ChieError, Result};
use crate::storage::traits::StorageBackend;
use crate::storage::types::{Record, RowId};
use crate::vault::CredentialVault;

/// CRUD over one encrypted collection.
pub struct RecordStore<'v, B: StorageBackend, R: Record> {
    vault: &'v CredentialVault<B>,
    index: HashMap<Uuid, RowId>,
    indexed: bool,
    _record: PhantomData<R>,
}

impl<'v, B: StorageBackend, R: Record> RecordStore<'v, B, R> {
    pub fn new(vault: &'v CredentialVault<B>) -> Self {
        Self {
            vault,
            index: HashMap::new(),
            indexed: false,
            _record: PhantomData,
        }
    }

    /// Decrypt every row of the collection.
    ///
    /// Rows that fail to decrypt are skipped and logged. When several rows
    /// carry the same record id, the oldest row wins and the others are
    /// deleted. Results are sorted per record type.
    pub fn load_all(&mut self) -> Result<Vec<R>> {
        let key = self.vault.master_key()?;
        let backend = self.vault.backend();
        let collection = R::COLLECTION;

        let mut index = HashMap::new();
        let mut records = Vec::new();
        let mut duplicates = Vec::new();

        for row in backend.rows(collection)? {
            let record: R = match decrypt_record(key, &row.envelope) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        collection = %collection,
                        row_id = row.row_id,
                        "skipping undecryptable row: {}",
                        e
                    );
                    continue;
                }
            };

            if index.contains_key(&record.id()) {
                duplicates.push(row.row_id);
            } else {
                index.insert(record.id(), row.row_id);
                records.push(record);
            }
        }

        if !duplicates.is_empty() {
            let anomaly = ChieError::StorageIntegrityAnomaly(format!(
                "{} duplicate rows in {}",
                duplicates.len(),
                collection
            ));
            warn!("{}; removing extra rows", anomaly);
            backend.delete_rows(collection, &duplicates)?;
        }

        self.index = index;
        self.indexed = true;

        R::sort(&mut records);
        debug!(collection = %collection, count = records.len(), "loaded records");
        Ok(records)
    }

    fn ensure_index(&mut self) -> Result<()> {
        if !self.indexed {
            self.load_all()?;
        }
        Ok(())
    }

    /// Encrypt and persist `record`.
    ///
    /// If a row already holds a record with the same id it is overwritten, so
    /// adding the same record twice leaves a single row.
    pub fn add(&mut self, record: &R) -> Result<RowId> {
        self.ensure_index()?;
        let envelope = encrypt_record(self.vault.master_key()?, record)?;
        let backend = self.vault.backend();

        if let Some(&row_id) = self.index.get(&record.id()) {
            if backend.replace_row(R::COLLECTION, row_id, &envelope)? {
                debug!(row_id, "replaced existing {} row", R::COLLECTION);
                return Ok(row_id);
            }
            self.index.remove(&record.id());
        }

        let row_id = backend.insert_row(R::COLLECTION, &envelope)?;
        self.index.insert(record.id(), row_id);
        Ok(row_id)
    }

    /// Overwrite the row holding `id` with `record`.
    ///
    /// Returns `false` when no row holds `id`.
    ///
    /// # Errors
    ///
    /// Returns `ChieError::InvalidInput` if `record` carries a different id.
    pub fn update(&mut self, id: Uuid, record: &R) -> Result<bool> {
        if record.id() != id {
            return Err(ChieError::InvalidInput(format!(
                "Record id {} does not match {}",
                record.id(),
                id
            )));
        }
        let envelope = encrypt_record(self.vault.master_key()?, record)?;

        self.mutate(id, |backend, row_id| {
            backend.replace_row(R::COLLECTION, row_id, &envelope)
        })
    }

    /// Delete the row holding `id`.
    ///
    /// Returns `false` when no row holds `id`.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        let deleted = self.mutate(id, |backend, row_id| {
            Ok(backend.delete_rows(R::COLLECTION, &[row_id])? > 0)
        })?;
        if deleted {
            self.index.remove(&id);
        }
        Ok(deleted)
    }

    /// Look up a single record by id.
    pub fn get(&mut self, id: Uuid) -> Result<Option<R>> {
        Ok(self.load_all()?.into_iter().find(|record| record.id() == id))
    }

    /// Number of stored rows, including any that would fail to decrypt.
    pub fn row_count(&self) -> Result<usize> {
        self.vault.backend().count_rows(R::COLLECTION)
    }

    /// Apply `op` to the row holding `id`, rebuilding a stale index once.
    fn mutate<F>(&mut self, id: Uuid, op: F) -> Result<bool>
    where
        F: Fn(&B, RowId) -> Result<bool>,
    {
        self.ensure_index()?;
        for attempt in 0..2 {
            let Some(&row_id) = self.index.get(&id) else {
                return Ok(false);
            };
            if op(self.vault.backend(), row_id)? {
                return Ok(true);
            }
            if attempt == 0 {
                debug!(row_id, "stale {} index, reloading", R::COLLECTION);
                self.load_all()?;
            }
        }
        Ok(false)
    }
}
