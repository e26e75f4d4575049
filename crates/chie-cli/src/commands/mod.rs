//! Command handlers, one module per top-level subcommand.

pub mod event;
pub mod export;
pub mod init;
pub mod journal;
pub mod misc;
pub mod recover;
pub mod status;
pub mod task;

use chie_core::{Record, RecordStore, SqliteStorage};

use crate::app::AppContext;
use crate::cli::DeleteArgs;
use crate::errors::CliError;
use crate::helpers::{confirm, find_by_id, is_interactive};
use crate::ui::short_id;

/// Resolve, confirm, and delete one record.
pub(crate) fn delete_record<R: Record>(
    ctx: &AppContext<'_>,
    args: &DeleteArgs,
    noun: &str,
    describe: impl Fn(&R) -> String,
) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let mut store: RecordStore<'_, SqliteStorage, R> = RecordStore::new(&vault);
    let records = store.load_all()?;
    let record = find_by_id(&records, &args.id)?;
    let id = record.id();

    if !args.force {
        let interactive = is_interactive(args.no_input);
        if !interactive {
            return Err(CliError::invalid_input(format!(
                "Refusing to delete without confirmation. Use --force to delete {} {}.",
                noun,
                short_id(&id)
            ))
            .into());
        }
        let prompt = format!("Delete {} {} ({})?", noun, short_id(&id), describe(record));
        if !confirm(&prompt, false, interactive)? {
            if !ctx.quiet() {
                println!("Cancelled.");
            }
            return Ok(());
        }
    }

    if !store.delete(id)? {
        return Err(CliError::not_found(
            format!("{} {} no longer exists", noun, short_id(&id)),
            "Hint: list records to see their IDs.",
        )
        .into());
    }
    if !ctx.quiet() {
        println!("Deleted {} {}", noun, short_id(&id));
    }
    Ok(())
}
