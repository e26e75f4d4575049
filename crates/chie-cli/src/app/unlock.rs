//! Opening the database and unlocking the vault with retry logic.

use chie_core::migrate::migrate_legacy_plaintext;
use chie_core::{CredentialVault, MigrationReport, SqliteStorage};
use zeroize::Zeroizing;

use crate::constants::{env, MAX_UNLOCK_ATTEMPTS};
use crate::errors::CliError;
use crate::helpers::{env_secret, is_interactive, prompt_secret};
use crate::ui::Spinner;

use super::context::AppContext;
use super::resolver::missing_vault_message;

/// A vault over the on-disk SQLite database.
pub type UnlockedVault = CredentialVault<SqliteStorage>;

/// Open an existing, configured vault without unlocking it.
pub fn open_existing(ctx: &AppContext<'_>) -> anyhow::Result<UnlockedVault> {
    let path = ctx.db_path()?;
    if !path.exists() {
        return Err(CliError::not_found(
            format!("No vault found at {}", path.display()),
            "Run `chie init` to create one.",
        )
        .into());
    }

    let vault = CredentialVault::new(SqliteStorage::open(&path)?);
    if !vault.is_configured()? {
        return Err(anyhow::anyhow!(missing_vault_message(&path)));
    }
    Ok(vault)
}

/// Unlock with the password from `CHIE_PASSWORD` or an interactive prompt.
pub fn open_unlocked(ctx: &AppContext<'_>, no_input: bool) -> anyhow::Result<UnlockedVault> {
    let mut vault = open_existing(ctx)?;
    let interactive = is_interactive(no_input);

    let unlocked = unlock_with_retry(
        ctx,
        interactive,
        env::PASSWORD,
        "Password",
        |secret| Ok(vault.unlock_with_password(secret)?),
    )?;
    if !unlocked {
        return Err(CliError::auth_failed_with_hint(
            "Incorrect password.",
            "Hint: If you forgot your password, run `chie recover` with your recovery phrase.",
        )
        .into());
    }

    run_legacy_migration(ctx, &vault)?;
    Ok(vault)
}

/// Unlock with the recovery phrase from `CHIE_RECOVERY_PHRASE` or a prompt.
pub fn unlock_with_recovery(ctx: &AppContext<'_>, no_input: bool) -> anyhow::Result<UnlockedVault> {
    let mut vault = open_existing(ctx)?;
    if !vault.has_recovery()? {
        return Err(CliError::not_found(
            "This vault has no recovery phrase.",
            "Recovery phrases are created by `chie init`.",
        )
        .into());
    }
    let interactive = is_interactive(no_input);

    let unlocked = unlock_with_retry(
        ctx,
        interactive,
        env::RECOVERY_PHRASE,
        "Recovery phrase",
        |secret| Ok(vault.unlock_with_recovery(secret)?),
    )?;
    if !unlocked {
        return Err(CliError::auth_failed("Incorrect recovery phrase.").into());
    }

    run_legacy_migration(ctx, &vault)?;
    Ok(vault)
}

/// Try the environment secret once, otherwise prompt up to the attempt limit.
fn unlock_with_retry<F>(
    ctx: &AppContext<'_>,
    interactive: bool,
    env_var: &str,
    label: &str,
    mut attempt: F,
) -> anyhow::Result<bool>
where
    F: FnMut(&str) -> anyhow::Result<bool>,
{
    let show_spinner = interactive && !ctx.quiet();

    if let Some(secret) = env_secret(env_var) {
        return with_spinner(show_spinner, || attempt(secret.as_str()));
    }

    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No {} provided and no TTY available. Set {}.",
            label.to_lowercase(),
            env_var
        ))
        .into());
    }

    for attempts in 1..=MAX_UNLOCK_ATTEMPTS {
        let secret: Zeroizing<String> = prompt_secret(label)?;
        if with_spinner(show_spinner, || attempt(secret.as_str()))? {
            return Ok(true);
        }
        let remaining = MAX_UNLOCK_ATTEMPTS - attempts;
        if remaining > 0 {
            eprintln!(
                "Incorrect {}. {} attempt{} remaining.",
                label.to_lowercase(),
                remaining,
                if remaining == 1 { "" } else { "s" }
            );
        }
    }

    Err(CliError::auth_failed(format!(
        "Too many failed {} attempts.",
        label.to_lowercase()
    ))
    .into())
}

pub fn with_spinner<T>(
    enabled: bool,
    op: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let spinner = Spinner::new(enabled, "Deriving key");
    spinner.start();
    let result = op();
    spinner.clear();
    result
}

fn run_legacy_migration(ctx: &AppContext<'_>, vault: &UnlockedVault) -> anyhow::Result<()> {
    let Some(legacy) = ctx.legacy_dir()? else {
        return Ok(());
    };

    let report = migrate_legacy_plaintext(vault, &legacy)?;
    print_migration_report(ctx, &report);
    Ok(())
}

/// Tell the user what a migration run imported and what it left behind.
pub fn print_migration_report(ctx: &AppContext<'_>, report: &MigrationReport) {
    if report.migrated() > 0 && !ctx.quiet() {
        eprintln!(
            "Imported {} legacy records ({} journals, {} tasks, {} events).",
            report.migrated(),
            report.journals,
            report.tasks,
            report.events
        );
    }
    if report.skipped > 0 {
        eprintln!(
            "Warning: {} legacy records could not be read and were skipped.",
            report.skipped
        );
    }
    for collection in &report.retained {
        eprintln!(
            "Kept {} so the unreadable records are not lost.",
            collection.legacy_file_name()
        );
    }
}
