//! Command implementations for vault-cli

pub mod config;
pub mod provision;
pub mod sync;
pub mod token;

pub use config::{run_config, run_status};
pub use provision::{run_create_repo, run_init, run_set_remote};
pub use sync::run_sync;
pub use token::{run_clear_token, run_set_token};

use std::path::Path;

use vault_core::VaultSession;
use vault_credentials::{MachineKeyCipher, TokenVault};

use crate::error::Result;

/// Open a session for the selected vault.
///
/// Uses the per-installation credential store unless a data directory
/// override was given (`--data-dir` / `VAULTSYNC_DATA_DIR`).
pub(crate) fn open_session(vault: &Path, data_dir: Option<&Path>) -> Result<VaultSession> {
    match data_dir {
        Some(dir) => {
            let cipher = MachineKeyCipher::load_or_create(&dir.join("machine.key"))?;
            let store = TokenVault::new(dir.join("credentials.json"), Box::new(cipher));
            Ok(VaultSession::new(vault, store)?)
        }
        None => Ok(VaultSession::open_default(vault)?),
    }
}
