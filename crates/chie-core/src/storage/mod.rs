//! Storage abstraction layer.
//!
//! This module defines the `StorageBackend` trait and its SQLite
//! implementation, the record types, and the `RecordStore` that applies the
//! envelope codec to every record on its way in and out.

pub mod legacy;
pub mod records;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use legacy::LegacyDir;
pub use records::RecordStore;
pub use sqlite::SqliteStorage;
pub use traits::StorageBackend;
pub use types::{
    parse_timestamp, Collection, Event, Journal, Record, RowId, Sentiment, StoredRow, Task,
};
