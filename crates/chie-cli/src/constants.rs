//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, database, record).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password or phrase, too many attempts).
    pub const AUTH_FAILED: i32 = 5;
}

/// Environment variables read by the CLI.
pub mod env {
    pub const CONFIG: &str = "CHIE_CONFIG";
    pub const DB: &str = "CHIE_DB";
    pub const PASSWORD: &str = "CHIE_PASSWORD";
    pub const RECOVERY_PHRASE: &str = "CHIE_RECOVERY_PHRASE";
    pub const EXPORT_PASSPHRASE: &str = "CHIE_EXPORT_PASSPHRASE";
    pub const LOG: &str = "CHIE_LOG";
}

/// Password and phrase prompts allow this many tries.
pub const MAX_UNLOCK_ATTEMPTS: u32 = 3;
