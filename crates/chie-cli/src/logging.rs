//! Log output for the CLI.
//!
//! Core events go to stderr through `tracing-subscriber`, filtered by
//! `CHIE_LOG` (same syntax as `RUST_LOG`), `warn` by default.

use tracing_subscriber::EnvFilter;

use crate::constants::env;

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(env::LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
