//! Error types for vault-git

use std::path::PathBuf;

/// Result type for vault-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Rebase stopped on conflicting changes to {path}")]
    RebaseConflict { path: String },

    #[error("Network operation timed out after {seconds}s")]
    Timeout { seconds: u64 },
}
