use chie_core::migrate::migration_completed;
use chie_core::{Collection, CredentialVault, SqliteStorage, StorageBackend, VERSION};

use crate::app::AppContext;
use crate::cli::StatusArgs;
use crate::output::print_json;

/// Report vault state without unlocking it.
pub fn handle_status(ctx: &AppContext<'_>, args: &StatusArgs) -> anyhow::Result<()> {
    let db_path = ctx.db_path()?;
    let exists = db_path.exists();

    let (configured, has_recovery, migrated, counts) = if exists {
        let vault = CredentialVault::new(SqliteStorage::open(&db_path)?);
        let backend = vault.backend();
        let mut counts = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            counts.push((collection, backend.count_rows(collection)?));
        }
        (
            vault.is_configured()?,
            vault.has_recovery()?,
            migration_completed(backend)?,
            counts,
        )
    } else {
        (false, false, false, Vec::new())
    };

    if args.json {
        let rows: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(collection, count)| (collection.to_string(), serde_json::json!(count)))
            .collect();
        return print_json(&serde_json::json!({
            "version": VERSION,
            "database": db_path,
            "exists": exists,
            "configured": configured,
            "recovery": has_recovery,
            "legacyMigrated": migrated,
            "rows": rows,
        }));
    }

    println!("Chie {}", VERSION);
    println!("Database: {}", db_path.display());
    if !exists {
        println!("Status: no vault (run `chie init`)");
        return Ok(());
    }
    println!(
        "Status: {}",
        if configured { "configured" } else { "not configured" }
    );
    println!(
        "Recovery phrase: {}",
        if has_recovery { "set" } else { "not set" }
    );
    println!(
        "Legacy migration: {}",
        if migrated { "done" } else { "not run" }
    );
    for (collection, count) in counts {
        println!("{}: {} rows", collection, count);
    }
    Ok(())
}
