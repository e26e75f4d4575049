//! One-time migration of legacy plaintext collections.
//!
//! Runs at most once per database: a `migrationCompleted` flag in `meta` and a
//! non-empty journals collection both short-circuit it. All three legacy files
//! are read and parsed before anything is written. A plaintext file is deleted
//! only once every record in it has been encrypted; files holding unreadable
//! records stay on disk.

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::storage::{
    Collection, Event, Journal, LegacyDir, Record, RecordStore, StorageBackend, Task,
};
use crate::vault::CredentialVault;

/// Meta key recording that migration has run.
pub const MIGRATION_FLAG: &str = "migrationCompleted";

/// What a migration run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Nothing was migrated because the database was already migrated or
    /// already held journals.
    pub already_complete: bool,
    pub journals: usize,
    pub tasks: usize,
    pub events: usize,
    /// Legacy records that could not be parsed.
    pub skipped: usize,
    /// Collections whose legacy file was left on disk.
    pub retained: Vec<Collection>,
}

impl MigrationReport {
    pub fn migrated(&self) -> usize {
        self.journals + self.tasks + self.events
    }
}

/// Whether the migration flag is set.
pub fn migration_completed<B: StorageBackend>(backend: &B) -> Result<bool> {
    Ok(backend.meta(MIGRATION_FLAG)?.as_deref() == Some("true"))
}

/// Records of one legacy file that parsed, plus a count of those that did not.
struct Parsed<R> {
    records: Vec<R>,
    skipped: usize,
}

/// Encrypt legacy plaintext records into the database.
///
/// Safe to call on every start; it does nothing once the flag is set. The
/// vault must be unlocked unless the flag is already set.
///
/// # Errors
///
/// A legacy file that is not a JSON array aborts the run before any record is
/// written, leaving every file in place and the flag unset.
pub fn migrate_legacy_plaintext<B: StorageBackend>(
    vault: &CredentialVault<B>,
    legacy: &LegacyDir,
) -> Result<MigrationReport> {
    let backend = vault.backend();
    if migration_completed(backend)? {
        return Ok(MigrationReport {
            already_complete: true,
            ..MigrationReport::default()
        });
    }

    vault.master_key()?;

    if backend.count_rows(Collection::Journals)? > 0 {
        if legacy.has_any() {
            warn!(
                dir = %legacy.path().display(),
                "journals already present; legacy files left in place"
            );
        }
        info!("marking legacy migration complete");
        backend.set_meta(MIGRATION_FLAG, "true")?;
        return Ok(MigrationReport {
            already_complete: true,
            ..MigrationReport::default()
        });
    }

    let journals = parse_collection::<Journal>(legacy)?;
    let tasks = parse_collection::<Task>(legacy)?;
    let events = parse_collection::<Event>(legacy)?;

    let mut report = MigrationReport {
        journals: store_collection(vault, &journals.records)?,
        tasks: store_collection(vault, &tasks.records)?,
        events: store_collection(vault, &events.records)?,
        ..MigrationReport::default()
    };

    for (collection, skipped) in [
        (Collection::Journals, journals.skipped),
        (Collection::Tasks, tasks.skipped),
        (Collection::Events, events.skipped),
    ] {
        report.skipped += skipped;
        if skipped == 0 {
            legacy.remove(collection)?;
        } else {
            warn!(
                collection = %collection,
                skipped,
                "keeping {} because it holds unreadable records",
                collection.legacy_file_name()
            );
            report.retained.push(collection);
        }
    }

    backend.set_meta(MIGRATION_FLAG, "true")?;
    info!(
        journals = report.journals,
        tasks = report.tasks,
        events = report.events,
        skipped = report.skipped,
        "legacy migration complete"
    );
    Ok(report)
}

fn parse_collection<R: Record>(legacy: &LegacyDir) -> Result<Parsed<R>> {
    let collection = R::COLLECTION;
    let mut parsed = Parsed {
        records: Vec::new(),
        skipped: 0,
    };

    for (position, item) in legacy.read(collection)?.into_iter().enumerate() {
        match serde_json::from_value::<R>(with_uuid_id(item)) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                warn!(
                    collection = %collection,
                    position,
                    "skipping unreadable legacy record: {}",
                    e
                );
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

fn store_collection<B: StorageBackend, R: Record>(
    vault: &CredentialVault<B>,
    records: &[R],
) -> Result<usize> {
    let mut store: RecordStore<'_, B, R> = RecordStore::new(vault);
    for record in records {
        store.add(record)?;
    }
    Ok(records.len())
}

/// Legacy records used numeric ids; give those a fresh UUID.
fn with_uuid_id(mut item: Value) -> Value {
    if let Value::Object(fields) = &mut item {
        let valid = fields
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| Uuid::parse_str(id).is_ok());
        if !valid {
            fields.insert(
                "id".to_string(),
                Value::String(Uuid::now_v7().to_string()),
            );
        }
    }
    item
}
