//! Error types for Chie core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages and exit codes.

use thiserror::Error;

/// Result type alias for Chie operations.
pub type Result<T> = std::result::Result<T, ChieError>;

/// Core error type for Chie operations.
#[derive(Debug, Error)]
pub enum ChieError {
    /// Password rejected at setup time
    #[error("Password must be at least {min} characters (got {actual})")]
    WeakSecret { min: usize, actual: usize },

    /// Wrong credential or corrupted credential wrap.
    ///
    /// Deliberately carries no detail about which of the two occurred.
    #[error("Incorrect credential")]
    AuthenticationFailure,

    /// A single envelope failed authentication
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Encrypt/decrypt attempted without a resident master key
    #[error("Vault is locked")]
    VaultLocked,

    /// Password setup attempted on a vault that already has credentials
    #[error("Vault is already configured")]
    AlreadyConfigured,

    /// Re-typed recovery phrase did not match the generated one
    #[error("Recovery phrase does not match")]
    RecoveryMismatch,

    /// Two storage rows decrypted to the same record identifier
    #[error("Storage integrity anomaly: {0}")]
    StorageIntegrityAnomaly(String),

    /// A stored row whose columns have the wrong shape (bad lengths)
    #[error("Malformed stored row: {0}")]
    MalformedRow(String),

    /// Encryption or key handling error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
