//! Error types for vault-core

use crate::sync::SyncPhase;
use std::path::PathBuf;

/// Result type for vault-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The URL does not name a repository on the supported host.
    #[error("Unsupported remote URL: {url}")]
    UnsupportedRemote { url: String },

    /// Sync was attempted on a vault that is missing a repository,
    /// remote, or stored token.
    #[error("Sync is not configured: {reason}")]
    NotConfigured { reason: String },

    /// The hosting provider rejected a repository-creation request.
    #[error("GitHub API request failed ({status}): {message}")]
    ProviderApi { status: u16, message: String },

    /// The hosting provider's response could not be understood.
    #[error("Unexpected GitHub API response: {message}")]
    InvalidResponse { message: String },

    /// A sync cycle failed. The message has already passed through
    /// credential redaction and is safe to display or log.
    #[error("Sync failed while {phase}: {message}")]
    SyncFailed { phase: SyncPhase, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Credentials(#[from] vault_credentials::Error),

    #[error(transparent)]
    Git(#[from] vault_git::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
