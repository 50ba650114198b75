//! The vault session handle.
//!
//! One [`VaultSession`] per open vault. Every engine operation hangs
//! off the session, so nothing in the engine is process-global and two
//! vaults can be driven side by side without cross-talk. `run_sync`
//! takes `&mut self`: one handle cannot have two cycles in flight, and
//! serializing calls across handles for the same directory is the
//! embedder's job.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use vault_credentials::TokenVault;
use vault_git::{RepositoryState, abort_rebase_if_any, inspect, working_tree_status};
use vault_remote::RemoteDescriptor;

use crate::github::GithubClient;
use crate::redact::redact_credentials;
use crate::sync::{SyncOutcome, run_cycle};
use crate::{Error, Result};

/// Directory for engine-private metadata inside a vault. Seeded into
/// the ignore file so it is never tracked or pushed.
pub const METADATA_DIR: &str = ".vaultsync";

const IGNORE_FILE: &str = ".gitignore";
const DEFAULT_IGNORE_RULES: &str = ".vaultsync/\n.DS_Store\n";
const INIT_COMMIT_MESSAGE: &str = "vault init";

/// Read-only sync summary for display surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SyncConfig {
    /// Whether a sync could run right now.
    pub enabled: bool,
    pub is_repo: bool,
    pub has_token: bool,
    pub remote_url: Option<String>,
    pub repo_slug: Option<String>,
    pub branch: Option<String>,
    /// Why sync is disabled, when it is.
    pub reason: Option<String>,
}

/// Cheap working-tree summary. Never performs network I/O.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub dirty: bool,
    pub changed_count: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Result of [`VaultSession::init_repository`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InitOutcome {
    /// True when the vault was already under version control and
    /// nothing was done. Initialization is idempotent.
    pub already_initialized: bool,
}

/// Result of [`VaultSession::create_remote_repository`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRemote {
    pub descriptor: RemoteDescriptor,
    pub clone_url: String,
}

/// Handle for one open vault.
pub struct VaultSession {
    root: PathBuf,
    credentials: TokenVault,
    github: GithubClient,
    /// When this session last completed a sync cycle. Process-local;
    /// a missed "last sync" display after restart is cosmetic.
    last_sync: Option<DateTime<Utc>>,
}

impl VaultSession {
    /// Open a session over `root` with an explicit credential store.
    pub fn new(root: impl Into<PathBuf>, credentials: TokenVault) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            credentials,
            github: GithubClient::new()?,
            last_sync: None,
        })
    }

    /// Open a session with the per-installation credential store.
    pub fn open_default(root: impl Into<PathBuf>) -> Result<Self> {
        Self::new(root, TokenVault::open_default()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Summarize the vault's sync configuration for display.
    ///
    /// Resolution failures (no repository, no remote, unsupported
    /// remote, no token) are states here, never errors.
    pub fn sync_config(&self) -> SyncConfig {
        let state = inspect(&self.root);
        if !state.is_repo {
            return SyncConfig {
                enabled: false,
                is_repo: false,
                has_token: false,
                remote_url: None,
                repo_slug: None,
                branch: None,
                reason: Some("vault is not under version control".to_string()),
            };
        }

        let Some(descriptor) = state.descriptor.clone() else {
            return SyncConfig {
                enabled: false,
                is_repo: true,
                has_token: false,
                remote_url: state.remote_url.clone(),
                repo_slug: None,
                branch: Some(state.branch.clone()),
                reason: Some(missing_descriptor_reason(&state)),
            };
        };

        let has_token = self.credentials.contains(&descriptor).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read credential store");
            false
        });

        SyncConfig {
            enabled: has_token,
            is_repo: true,
            has_token,
            remote_url: state.remote_url,
            repo_slug: Some(descriptor.slug()),
            branch: Some(state.branch),
            reason: (!has_token).then(|| "no token saved for this repository".to_string()),
        }
    }

    /// Bring the vault under version control.
    ///
    /// Idempotent: an already-initialized vault reports
    /// `already_initialized: true` and is otherwise untouched — no
    /// second initial commit, no ignore-file rewrite. On first run
    /// this seeds an ignore file (when none exists), stages every
    /// file, and creates the initial commit. A vault with zero
    /// trackable files still gets its initial (empty) commit.
    pub fn init_repository(&self) -> Result<InitOutcome> {
        if inspect(&self.root).is_repo {
            return Ok(InitOutcome {
                already_initialized: true,
            });
        }

        let repo = vault_git::init(&self.root)?;
        self.seed_ignore_file()?;
        vault_git::commit_all(&repo, INIT_COMMIT_MESSAGE)?;

        tracing::info!(root = %self.root.display(), "initialized vault repository");
        Ok(InitOutcome {
            already_initialized: false,
        })
    }

    fn seed_ignore_file(&self) -> Result<()> {
        let ignore_path = self.root.join(IGNORE_FILE);
        if ignore_path.exists() {
            return Ok(());
        }
        fs::write(&ignore_path, DEFAULT_IGNORE_RULES).map_err(|e| Error::io(&ignore_path, e))
    }

    /// Point the vault at a hosted repository, replacing any existing
    /// remote.
    pub fn set_remote(&self, url: &str) -> Result<RemoteDescriptor> {
        let descriptor =
            vault_remote::resolve(url).ok_or_else(|| Error::UnsupportedRemote {
                url: url.to_string(),
            })?;
        let repo = vault_git::open(&self.root)?;
        vault_git::set_remote(&repo, url)?;
        Ok(descriptor)
    }

    /// Create a repository on the hosting provider, link it as the
    /// vault's remote, and store the token under the new identity.
    pub fn create_remote_repository(
        &self,
        token: &str,
        name: &str,
        is_private: bool,
    ) -> Result<CreatedRemote> {
        // Fail before the network call if the vault is not a repository.
        let repo = vault_git::open(&self.root)?;

        let created = self.github.create_repository(token, name, is_private)?;
        let descriptor = vault_remote::resolve(&created.clone_url).ok_or_else(|| {
            Error::InvalidResponse {
                message: format!("clone URL {} does not name a supported repository", created.clone_url),
            }
        })?;

        vault_git::set_remote(&repo, &created.clone_url)?;
        self.credentials.save(&descriptor, token)?;

        tracing::info!(slug = %descriptor.slug(), "created and linked remote repository");
        Ok(CreatedRemote {
            descriptor,
            clone_url: created.clone_url,
        })
    }

    /// Store a token for the vault's current remote.
    pub fn set_token(&self, token: &str) -> Result<RemoteDescriptor> {
        let descriptor = self.current_descriptor()?;
        self.credentials.save(&descriptor, token)?;
        Ok(descriptor)
    }

    /// Remove the stored token for the vault's current remote.
    pub fn clear_token(&self) -> Result<()> {
        let descriptor = self.current_descriptor()?;
        self.credentials.clear(&descriptor)?;
        Ok(())
    }

    /// Run one full sync cycle: commit, fetch, rebase, push.
    ///
    /// Fails fast with [`Error::NotConfigured`] — before touching the
    /// credential store or the network — when the vault has no
    /// repository or no supported remote. On any phase failure the
    /// orchestrator aborts an in-progress rebase so the working tree
    /// is never left mid-operation, then surfaces the error with
    /// credentials redacted.
    pub fn run_sync(&mut self) -> Result<SyncOutcome> {
        let state = inspect(&self.root);
        if !state.is_repo {
            return Err(Error::NotConfigured {
                reason: "vault is not under version control".to_string(),
            });
        }
        let Some(descriptor) = state.descriptor.clone() else {
            return Err(Error::NotConfigured {
                reason: missing_descriptor_reason(&state),
            });
        };

        let token = self
            .credentials
            .load(&descriptor)?
            .ok_or_else(|| Error::NotConfigured {
                reason: "no token saved for this repository".to_string(),
            })?;

        let repo = vault_git::open(&self.root)?;
        match run_cycle(&repo, &descriptor, &state.branch, &token) {
            Ok(outcome) => {
                self.last_sync = Some(Utc::now());
                Ok(outcome)
            }
            Err((phase, error)) => {
                // Recover locally before surfacing anything: a failed
                // cycle must not leave a rebase blocking future edits.
                if let Err(abort_error) = abort_rebase_if_any(&repo) {
                    tracing::warn!(error = %abort_error, "could not abort in-progress rebase");
                }
                Err(Error::SyncFailed {
                    phase,
                    message: redact_credentials(&error.to_string()),
                })
            }
        }
    }

    /// Working-tree summary plus the session's last successful sync.
    pub fn sync_status(&self) -> Result<SyncStatus> {
        let Ok(repo) = vault_git::open(&self.root) else {
            return Ok(SyncStatus {
                dirty: false,
                changed_count: 0,
                last_sync: self.last_sync,
            });
        };
        let status = working_tree_status(&repo)?;
        Ok(SyncStatus {
            dirty: status.dirty,
            changed_count: status.changed_count,
            last_sync: self.last_sync,
        })
    }

    fn current_descriptor(&self) -> Result<RemoteDescriptor> {
        let state = inspect(&self.root);
        if !state.is_repo {
            return Err(Error::NotConfigured {
                reason: "vault is not under version control".to_string(),
            });
        }
        match state.descriptor {
            Some(descriptor) => Ok(descriptor),
            None => Err(Error::NotConfigured {
                reason: missing_descriptor_reason(&state),
            }),
        }
    }
}

fn missing_descriptor_reason(state: &RepositoryState) -> String {
    match &state.remote_url {
        Some(url) => format!("remote {url} is not a supported github.com repository"),
        None => "no remote configured".to_string(),
    }
}
