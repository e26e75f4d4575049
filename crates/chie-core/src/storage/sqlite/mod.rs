//! SQLite storage backend.
//!
//! Every collection row is an opaque envelope (`nonce`, `ciphertext`); the
//! database never sees plaintext records or keys. Credential wraps are kept
//! as plain columns in `settings`.

mod row;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::crypto::Envelope;
use crate::error::{ChieError, Result};
use crate::storage::traits::StorageBackend;
use crate::storage::types::{Collection, RowId, StoredRow};
use crate::vault::{CredentialSlot, CredentialWrap};

use row::{EnvelopeRow, SettingsRow};

/// On-disk layout version recorded in `meta`.
pub const FORMAT_VERSION: &str = "1";

/// Meta key holding [`FORMAT_VERSION`].
pub const META_FORMAT_VERSION: &str = "format_version";

/// Meta key holding the database creation timestamp.
pub const META_CREATED_AT: &str = "created_at";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        salt BLOB NOT NULL,
        iv BLOB NOT NULL,
        wrapped_key BLOB NOT NULL,
        verifier_hash BLOB,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS journals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nonce BLOB NOT NULL,
        ciphertext BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nonce BLOB NOT NULL,
        ciphertext BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nonce BLOB NOT NULL,
        ciphertext BLOB NOT NULL
    );
"#;

/// SQLite-backed storage for encrypted Chie data.
pub struct SqliteStorage {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let storage = Self::with_connection(conn, Some(path.to_path_buf()))?;
        debug!("opened database at {}", path.display());
        Ok(storage)
    }

    /// Open a throwaway database held entirely in memory.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES (?1, ?2)",
            params![META_FORMAT_VERSION, FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES (?1, ?2)",
            params![META_CREATED_AT, Utc::now().to_rfc3339()],
        )?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Database file path, or `None` for in-memory storage.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ChieError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Run raw SQL, for tests that need to damage stored data.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<usize> {
        Ok(self.lock_conn()?.execute(sql, [])?)
    }
}

impl StorageBackend for SqliteStorage {
    fn load_credential(&self, slot: CredentialSlot) -> Result<Option<CredentialWrap>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT salt, iv, wrapped_key, verifier_hash FROM settings WHERE key = ?1",
                [slot.key()],
                |row| {
                    Ok(SettingsRow {
                        salt: row.get(0)?,
                        iv: row.get(1)?,
                        wrapped_key: row.get(2)?,
                        verifier_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;

        row.map(CredentialWrap::try_from).transpose()
    }

    fn store_credential(&self, slot: CredentialSlot, wrap: &CredentialWrap) -> Result<()> {
        let conn = self.lock_conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO settings (key, salt, iv, wrapped_key, verifier_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                slot.key(),
                &wrap.salt[..],
                &wrap.iv[..],
                &wrap.wrapped_key,
                wrap.verifier_hash.as_ref().map(|hash| &hash[..]),
                Utc::now().to_rfc3339(),
            ],
        )?;

        if inserted == 0 {
            return Err(ChieError::AlreadyConfigured);
        }
        Ok(())
    }

    fn meta(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn insert_row(&self, collection: Collection, envelope: &Envelope) -> Result<RowId> {
        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (nonce, ciphertext) VALUES (?1, ?2)",
                collection.table_name()
            ),
            params![&envelope.nonce[..], &envelope.ciphertext],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn rows(&self, collection: Collection) -> Result<Vec<StoredRow>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, nonce, ciphertext FROM {} ORDER BY id",
            collection.table_name()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(EnvelopeRow {
                id: row.get(0)?,
                nonce: row.get(1)?,
                ciphertext: row.get(2)?,
            })
        })?;

        let mut stored = Vec::new();
        for row in rows {
            let row = row?;
            let row_id = row.id;
            match StoredRow::try_from(row) {
                Ok(parsed) => stored.push(parsed),
                Err(ChieError::MalformedRow(reason)) => {
                    warn!(collection = %collection, row_id, "skipping malformed row: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(stored)
    }

    fn replace_row(
        &self,
        collection: Collection,
        row_id: RowId,
        envelope: &Envelope,
    ) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET nonce = ?1, ciphertext = ?2 WHERE id = ?3",
                collection.table_name()
            ),
            params![&envelope.nonce[..], &envelope.ciphertext, row_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_rows(&self, collection: Collection, row_ids: &[RowId]) -> Result<usize> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "DELETE FROM {} WHERE id = ?1",
                collection.table_name()
            ))?;
            for row_id in row_ids {
                removed += stmt.execute([row_id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }

    fn count_rows(&self, collection: Collection) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.table_name()),
            [],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| ChieError::Storage(format!("Invalid row count: {}", count)))
    }
}
