//! Error types for vault-credentials

use std::path::PathBuf;

/// Result type for vault-credentials operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-credentials operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Secure storage unavailable: {reason}")]
    EncryptionUnavailable { reason: String },

    #[error("Stored credential could not be decrypted (corrupt entry or foreign machine key)")]
    DecryptionFailed,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Credential store is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::EncryptionUnavailable {
            reason: reason.into(),
        }
    }
}
