//! Vault sync engine core
//!
//! Provisioning, credential wiring, and the commit → fetch → rebase →
//! push orchestration that keeps a local vault directory consistent
//! with its GitHub repository. The embedding application (or the
//! `vaultsync` CLI) drives everything through a [`VaultSession`].

pub mod error;
pub mod github;
pub mod redact;
pub mod session;
pub mod sync;

pub use error::{Error, Result};
pub use github::{CreatedRepository, GithubClient};
pub use redact::redact_credentials;
pub use session::{
    CreatedRemote, InitOutcome, METADATA_DIR, SyncConfig, SyncStatus, VaultSession,
};
pub use sync::{SyncOutcome, SyncPhase};
