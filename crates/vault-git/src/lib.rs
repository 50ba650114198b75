//! Git plumbing for the vault sync engine
//!
//! Inspection, local operations, and remote transfers over `git2`,
//! shared by the provisioner and the sync orchestrator.

pub mod error;
pub mod inspect;
pub mod ops;
pub mod transport;

pub use error::{Error, Result};
pub use inspect::{
    DEFAULT_BRANCH, REMOTE_NAME, RepositoryState, WorkingTreeStatus, current_branch, inspect, open,
    working_tree_status,
};
pub use ops::{commit_all, commit_index, init, set_remote, signature, stage_all};
pub use transport::{
    IntegrationOutcome, NETWORK_TIMEOUT, RemoteTip, abort_rebase_if_any, fetch_branch,
    integrate_remote, push_branch,
};
