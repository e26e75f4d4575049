//! Application-level utilities for the Chie CLI.
//!
//! This module provides:
//! - Path resolution for config, database, and legacy data
//! - A per-invocation context with lazily loaded config
//! - Unlock handling with retry logic

mod context;
mod resolver;
mod unlock;

pub use context::AppContext;
pub use resolver::resolve_config_path;
pub use unlock::{print_migration_report, unlock_with_recovery, with_spinner};
