use std::path::PathBuf;

use chie_core::{export_all, Event, Journal, RecordStore, SqliteStorage, Task};

use crate::app::{unlock_with_recovery, AppContext};
use crate::cli::RecoverArgs;

/// Unlock with the recovery phrase and confirm every collection decrypts.
pub fn handle_recover(ctx: &AppContext<'_>, args: &RecoverArgs) -> anyhow::Result<()> {
    let vault = unlock_with_recovery(ctx, args.no_input)?;

    let journals = RecordStore::<SqliteStorage, Journal>::new(&vault).load_all()?;
    let tasks = RecordStore::<SqliteStorage, Task>::new(&vault).load_all()?;
    let events = RecordStore::<SqliteStorage, Event>::new(&vault).load_all()?;

    if !ctx.quiet() {
        println!("Recovery phrase accepted.");
        println!(
            "Readable records: {} journals, {} tasks, {} events",
            journals.len(),
            tasks.len(),
            events.len()
        );
    }

    if let Some(path) = args.export.as_deref() {
        let bundle = export_all(&vault)?;
        super::export::write_bundle(ctx, &bundle, &PathBuf::from(path), false, args.no_input)?;
    }
    Ok(())
}
