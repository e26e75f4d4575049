//! Path resolution for config, database, and legacy files.

use std::path::{Path, PathBuf};

use crate::config::{default_config_path, default_db_path, ChieConfig};
use crate::constants::env;

/// Resolve the config file path, checking CHIE_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the database path: `--db`/`CHIE_DB`, then config, then the XDG default.
pub fn resolve_db_path(cli_db: Option<&str>, config: &ChieConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli_db.filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.storage.path.as_deref() {
        return Ok(PathBuf::from(path));
    }
    default_db_path()
}

/// Legacy plaintext directory from config, if one is set.
pub fn resolve_legacy_dir(config: &ChieConfig) -> Option<PathBuf> {
    config
        .legacy
        .dir
        .as_deref()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

/// Error message when no vault exists at the resolved path.
pub fn missing_vault_message(path: &Path) -> String {
    format!(
        "No vault found at {}\n\nRun:\n  chie init\n\nOr specify a database path:\n  CHIE_DB=/path/to/chie.db chie init",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_path_wins() {
        let config = ChieConfig::new(Path::new("/from/config.db"), None);
        let path = resolve_db_path(Some("/from/flag.db"), &config).unwrap();
        assert_eq!(path, PathBuf::from("/from/flag.db"));
    }

    #[test]
    fn test_config_path_used_without_flag() {
        let config = ChieConfig::new(Path::new("/from/config.db"), None);
        let path = resolve_db_path(None, &config).unwrap();
        assert_eq!(path, PathBuf::from("/from/config.db"));
    }

    #[test]
    fn test_legacy_dir_optional() {
        assert!(resolve_legacy_dir(&ChieConfig::default()).is_none());
        let config = ChieConfig::new(Path::new("/db"), Some(Path::new("/old")));
        assert_eq!(resolve_legacy_dir(&config), Some(PathBuf::from("/old")));
    }

    #[test]
    fn test_missing_vault_message_has_hint() {
        let message = missing_vault_message(Path::new("/nowhere/chie.db"));
        assert!(message.contains("/nowhere/chie.db"));
        assert!(message.contains("chie init"));
    }
}
