use std::path::{Path, PathBuf};

use chrono::Utc;
use zeroize::Zeroizing;

use chie_core::crypto::recovery_artifact;
use chie_core::fs::write_atomic;
use chie_core::{
    migrate_legacy_plaintext, ChieError, CredentialVault, LegacyDir, MasterKey, SqliteStorage,
};

use crate::app::{print_migration_report, resolve_config_path, with_spinner, AppContext};
use crate::cli::InitArgs;
use crate::config::{read_config, write_config, ChieConfig, LegacySection};
use crate::constants::env;
use crate::errors::CliError;
use crate::helpers::{env_secret, is_interactive, prompt_new_password, prompt_text};

pub fn handle_init(ctx: &AppContext<'_>, args: &InitArgs) -> anyhow::Result<()> {
    let db_path = ctx.db_path()?;
    let interactive = is_interactive(args.no_input);

    let mut vault = CredentialVault::new(SqliteStorage::open(&db_path)?);
    let resuming = vault.is_configured()?;
    let master_key = if resuming {
        if vault.has_recovery()? {
            return Err(CliError::invalid_input(format!(
                "A vault already exists at {}",
                db_path.display()
            ))
            .into());
        }
        if !ctx.quiet() {
            eprintln!("This vault has no recovery phrase yet. Unlock it to create one.");
        }
        vault = ctx.unlock(args.no_input)?;
        vault.master_key()?.clone()
    } else {
        create_password(ctx, &mut vault, interactive)?
    };

    let phrase = vault.begin_onboarding();
    let artifact = recovery_artifact(phrase, Utc::now());
    let shown = Zeroizing::new(phrase.expose().to_string());

    println!("Your recovery phrase:");
    println!();
    println!("    {}", shown.as_str());
    println!();
    println!("Write it down and keep it somewhere safe. It is the only way to");
    println!("regain access if you forget your password.");

    if let Some(file) = args.recovery_file.as_deref() {
        write_atomic(Path::new(file), artifact.as_bytes())?;
        if !ctx.quiet() {
            println!("Recovery key written to {}", file);
        }
    }

    if interactive {
        confirm_phrase(&mut vault, &master_key)?;
    } else {
        vault.finish_onboarding(&shown, &master_key)?;
    }

    let legacy_dir = args.legacy_dir.as_deref().map(PathBuf::from);
    let config_path = resolve_config_path()?;
    save_config(&config_path, &db_path, legacy_dir.as_deref())?;

    if let Some(dir) = legacy_dir {
        let report = migrate_legacy_plaintext(&vault, &LegacyDir::new(dir))?;
        print_migration_report(ctx, &report);
    }

    if !ctx.quiet() {
        println!();
        if resuming {
            println!("Recovery phrase added to the vault at {}", db_path.display());
        } else {
            println!("Vault created at {}", db_path.display());
        }
        println!("Config written to {}", config_path.display());
    }
    Ok(())
}

/// Read or prompt for the new password and create the vault's master key.
fn create_password(
    ctx: &AppContext<'_>,
    vault: &mut CredentialVault<SqliteStorage>,
    interactive: bool,
) -> anyhow::Result<MasterKey> {
    let password: Zeroizing<String> = match env_secret(env::PASSWORD) {
        Some(password) => password,
        None if interactive => prompt_new_password()?,
        None => {
            return Err(CliError::invalid_input(format!(
                "No password provided and no TTY available. Set {}.",
                env::PASSWORD
            ))
            .into())
        }
    };

    let show_spinner = interactive && !ctx.quiet();
    with_spinner(show_spinner, || Ok(vault.setup_password(&password)?))
}

/// Ask the user to re-type the phrase until it matches. An interrupted run is
/// resumed by the next `chie init`.
fn confirm_phrase(
    vault: &mut CredentialVault<SqliteStorage>,
    master_key: &MasterKey,
) -> anyhow::Result<()> {
    loop {
        let typed = Zeroizing::new(prompt_text("Re-type your recovery phrase to confirm")?);
        match vault.finish_onboarding(&typed, master_key) {
            Ok(()) => return Ok(()),
            Err(ChieError::RecoveryMismatch) => {
                eprintln!("That does not match. Check the phrase and try again.");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Record the database path (and legacy directory) in the config file,
/// keeping any other settings already there.
fn save_config(config_path: &Path, db_path: &Path, legacy_dir: Option<&Path>) -> anyhow::Result<()> {
    let mut config = if config_path.exists() {
        read_config(config_path)?
    } else {
        ChieConfig::default()
    };
    let fresh = ChieConfig::new(db_path, legacy_dir);
    config.storage = fresh.storage;
    if legacy_dir.is_some() {
        config.legacy = LegacySection {
            dir: fresh.legacy.dir,
        };
    }
    write_config(config_path, &config)
}
