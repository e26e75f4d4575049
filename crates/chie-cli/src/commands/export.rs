use std::path::PathBuf;

use chrono::Utc;
use dialoguer::Password;
use zeroize::Zeroizing;

use chie_core::export::default_file_name;
use chie_core::{export_all, ExportBundle};

use crate::app::AppContext;
use crate::cli::ExportArgs;
use crate::constants::env;
use crate::errors::CliError;
use crate::helpers::{env_secret, is_interactive};

/// age-sealed backups get this suffix on the default file name.
const SEALED_SUFFIX: &str = ".age";

pub fn handle_export(ctx: &AppContext<'_>, args: &ExportArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let bundle = export_all(&vault)?;
    let path = output_path(args.output.as_deref(), args.seal);
    write_bundle(ctx, &bundle, &path, args.seal, args.no_input)
}

/// Write `bundle` to `path`, sealing it when asked.
pub(crate) fn write_bundle(
    ctx: &AppContext<'_>,
    bundle: &ExportBundle,
    path: &std::path::Path,
    seal: bool,
    no_input: bool,
) -> anyhow::Result<()> {
    if seal {
        let passphrase = export_passphrase(no_input)?;
        bundle.write_sealed(path, &passphrase)?;
    } else {
        bundle.write_to(path)?;
    }

    if ctx.quiet() {
        println!("{}", path.display());
    } else {
        println!(
            "Exported {} records ({} journals, {} tasks, {} events) to {}",
            bundle.record_count(),
            bundle.journals.len(),
            bundle.tasks.len(),
            bundle.events.len(),
            path.display()
        );
        if !seal {
            eprintln!("Warning: the backup is not encrypted. Store it somewhere safe.");
        }
    }
    Ok(())
}

fn output_path(output: Option<&str>, seal: bool) -> PathBuf {
    match output {
        Some(path) => PathBuf::from(path),
        None => {
            let mut name = default_file_name(Utc::now().date_naive());
            if seal {
                name.push_str(SEALED_SUFFIX);
            }
            PathBuf::from(name)
        }
    }
}

fn export_passphrase(no_input: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(passphrase) = env_secret(env::EXPORT_PASSPHRASE) {
        return Ok(passphrase);
    }
    if !is_interactive(no_input) {
        return Err(CliError::invalid_input(format!(
            "No export passphrase provided and no TTY available. Set {}.",
            env::EXPORT_PASSPHRASE
        ))
        .into());
    }
    Password::new()
        .with_prompt("Backup passphrase")
        .with_confirmation("Confirm backup passphrase", "Passphrases do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}
