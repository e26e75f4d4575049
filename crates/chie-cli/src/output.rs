//! Output helpers shared by list and show commands.

use serde::Serialize;

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Keep the first `limit` items, if a limit was given.
pub fn apply_limit<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

/// Print a "nothing here" line unless quiet.
pub fn print_empty(what: &str, quiet: bool) {
    if !quiet {
        println!("No {} found.", what);
    }
}
