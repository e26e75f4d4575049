//! # Chie Core
//!
//! Core library for Chie, a client-side encrypted personal journal with tasks
//! and calendar events.
//!
//! This crate provides key management, record encryption, and storage
//! independent of any user interface.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2 key derivation, AES-256-GCM envelopes, recovery phrases
//! - **vault**: master key ownership, password and recovery wraps, lock state
//! - **storage**: backend trait, SQLite backend, encrypted record stores
//! - **migrate**: one-time import of legacy plaintext collections
//! - **export**: JSON backups, optionally age-sealed

pub mod crypto;
pub mod error;
pub mod export;
pub mod fs;
pub mod migrate;
pub mod storage;
pub mod vault;

pub use error::{ChieError, Result};
pub use export::{export_all, ExportBundle};
pub use migrate::{migrate_legacy_plaintext, MigrationReport};
pub use storage::{
    parse_timestamp, Collection, Event, Journal, LegacyDir, Record, RecordStore, Sentiment,
    SqliteStorage, StorageBackend, Task,
};
pub use vault::{CredentialVault, MasterKey};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
