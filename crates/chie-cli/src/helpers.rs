//! Input helpers shared by command handlers.

use std::io::{self, IsTerminal, Read};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{Confirm, Input, Password};
use uuid::Uuid;
use zeroize::Zeroizing;

use chie_core::crypto::MIN_PASSWORD_LENGTH;
use chie_core::{parse_timestamp, Record};

use crate::errors::CliError;

/// Prompts are allowed only on a TTY and without `--no-input`.
pub fn is_interactive(no_input: bool) -> bool {
    !no_input && io::stdin().is_terminal()
}

/// A non-empty secret from the environment.
pub fn env_secret(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

/// Prompt for a hidden secret.
pub fn prompt_secret(label: &str) -> anyhow::Result<Zeroizing<String>> {
    Password::new()
        .with_prompt(label)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", label.to_lowercase(), e))
}

/// Prompt for a new password with confirmation.
pub fn prompt_new_password() -> anyhow::Result<Zeroizing<String>> {
    Password::new()
        .with_prompt(format!("Choose a password (at least {} characters)", MIN_PASSWORD_LENGTH))
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for visible text input.
pub fn prompt_text(label: &str) -> anyhow::Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to read input: {}", e))
}

/// Ask a yes/no question; non-interactive sessions get `default`.
pub fn confirm(prompt: &str, default: bool, interactive: bool) -> anyhow::Result<bool> {
    if !interactive {
        return Ok(default);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

/// Parse a datetime string: RFC 3339, a zone-less local `YYYY-MM-DDTHH:MM`,
/// or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = parse_timestamp(value) {
        return Ok(parsed);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CliError::invalid_input(format!("Invalid date value: {}", value)))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(CliError::invalid_input(format!(
        "Invalid date/time (expected ISO-8601, YYYY-MM-DDTHH:MM or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

/// Find the record whose id equals or starts with `query`.
pub fn find_by_id<'r, R: Record>(records: &'r [R], query: &str) -> anyhow::Result<&'r R> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Err(CliError::invalid_input("ID cannot be empty").into());
    }

    if let Ok(id) = Uuid::parse_str(&query) {
        return records
            .iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found(&query));
    }

    let matches: Vec<&R> = records
        .iter()
        .filter(|record| record.id().to_string().starts_with(&query))
        .collect();
    match matches.as_slice() {
        [record] => Ok(*record),
        [] => Err(not_found(&query)),
        _ => Err(CliError::invalid_input(format!(
            "ID prefix {} is ambiguous ({} matches); use more characters",
            query,
            matches.len()
        ))
        .into()),
    }
}

fn not_found(query: &str) -> anyhow::Error {
    CliError::not_found(
        format!("No record found with ID {}", query),
        "Hint: list records to see their IDs.",
    )
    .into()
}

/// Read a body from the flag, stdin, or the editor.
pub fn read_body(
    no_input: bool,
    body: Option<String>,
    editor_override: Option<&str>,
    initial: &str,
) -> anyhow::Result<String> {
    if let Some(value) = body {
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(CliError::invalid_input("No input provided on stdin").into());
        }
        return Ok(trimmed);
    }

    if no_input {
        return Err(CliError::invalid_input("--no-input requires --body or content on stdin").into());
    }

    read_body_from_editor(editor_override, initial)
}

/// Open the editor to compose or revise a body.
fn read_body_from_editor(editor_override: Option<&str>, initial: &str) -> anyhow::Result<String> {
    let editor = editor_override
        .map(|value| value.to_string())
        .or_else(|| std::env::var("EDITOR").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("$EDITOR is not set; use --body or pipe content via stdin")
        })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let filename = format!("chie_entry_{}_{}.md", std::process::id(), nanos);
    let path = std::env::temp_dir().join(filename);

    chie_core::fs::write_atomic(&path, initial.as_bytes())?;

    let status = Command::new(editor)
        .arg(&path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        let _ = std::fs::remove_file(&path);
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?;
    let _ = std::fs::remove_file(&path);

    let trimmed = contents.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("Entry body is empty").into());
    }

    Ok(trimmed)
}
