//! Application context for the Chie CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-loaded configuration.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use tracing::debug;

use chie_core::LegacyDir;

use crate::cli::Cli;
use crate::config::{read_config, ChieConfig};

use super::resolver::{resolve_config_path, resolve_db_path, resolve_legacy_dir};
use super::unlock::{open_unlocked, UnlockedVault};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<ChieConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file contents, or defaults when no config file exists.
    pub fn config(&self) -> anyhow::Result<&ChieConfig> {
        self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if path.exists() {
                debug!("loading config from {}", path.display());
                read_config(&path)
            } else {
                debug!("no config at {}, using defaults", path.display());
                Ok(ChieConfig::default())
            }
        })
    }

    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        resolve_db_path(self.cli.db.as_deref(), self.config()?)
    }

    pub fn legacy_dir(&self) -> anyhow::Result<Option<LegacyDir>> {
        Ok(resolve_legacy_dir(self.config()?).map(LegacyDir::new))
    }

    /// Get the configured editor override, if any.
    pub fn editor(&self) -> anyhow::Result<Option<&str>> {
        Ok(self.config()?.ui.editor.as_deref())
    }

    /// Open the database and unlock it with the password.
    pub fn unlock(&self, no_input: bool) -> anyhow::Result<UnlockedVault> {
        open_unlocked(self, no_input)
    }
}
