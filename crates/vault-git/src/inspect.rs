//! Working-tree inspection.
//!
//! Every inspection is computed fresh: the tree can change between
//! calls (files edited, a remote added by hand) outside the engine's
//! control, so nothing here is cached or persisted.

use std::path::Path;

use git2::{Repository, RepositoryOpenFlags, Status, StatusOptions};

use vault_remote::RemoteDescriptor;

use crate::Result;

/// Branch name assumed when the repository has no resolvable branch,
/// e.g. a brand-new repository whose HEAD is still unborn.
pub const DEFAULT_BRANCH: &str = "main";

/// Remote name the engine configures and syncs against.
pub const REMOTE_NAME: &str = "origin";

/// Snapshot of a vault directory's version-control state.
#[derive(Debug, Clone)]
pub struct RepositoryState {
    /// Whether the directory is itself a git repository root.
    pub is_repo: bool,
    /// Current branch, or [`DEFAULT_BRANCH`] when none is resolvable.
    pub branch: String,
    /// Configured `origin` URL, if any. No remote is a valid state.
    pub remote_url: Option<String>,
    /// The remote URL resolved to a hosted-repository identity, when it
    /// points at the supported host.
    pub descriptor: Option<RemoteDescriptor>,
}

/// Inspect a vault directory.
///
/// Runs three independent probes — repository discovery, current
/// branch, configured remote — and degrades the corresponding field
/// when a probe fails rather than failing the inspection. A directory
/// that is not a repository, or has no remote, is a fully valid answer.
pub fn inspect(path: &Path) -> RepositoryState {
    let Ok(repo) = open(path) else {
        return RepositoryState {
            is_repo: false,
            branch: DEFAULT_BRANCH.to_string(),
            remote_url: None,
            descriptor: None,
        };
    };

    let branch = current_branch(&repo);
    let remote_url = remote_url(&repo);
    let descriptor = remote_url.as_deref().and_then(vault_remote::resolve);

    RepositoryState {
        is_repo: true,
        branch,
        remote_url,
        descriptor,
    }
}

/// Open the repository rooted exactly at `path`.
///
/// A vault is always its own repository root; discovery deliberately
/// does not walk up into enclosing repositories, which would attach the
/// vault to an unrelated project's history.
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open_ext(
        path,
        RepositoryOpenFlags::NO_SEARCH,
        std::iter::empty::<&std::ffi::OsStr>(),
    )
    .map_err(|_| crate::Error::NotARepository {
        path: path.to_path_buf(),
    })
}

/// Resolve the current branch name, falling back to [`DEFAULT_BRANCH`].
///
/// An unborn HEAD (repository with no commits yet) still names its
/// future branch through the symbolic HEAD target, so a freshly
/// initialized vault reports that name instead of an error.
pub fn current_branch(repo: &Repository) -> String {
    match repo.head() {
        Ok(head) if head.is_branch() => head.shorthand().unwrap_or(DEFAULT_BRANCH).to_string(),
        Ok(_) => {
            tracing::debug!("HEAD is detached; assuming default branch");
            DEFAULT_BRANCH.to_string()
        }
        Err(_) => unborn_branch(repo).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
    }
}

fn unborn_branch(repo: &Repository) -> Option<String> {
    let head = repo.find_reference("HEAD").ok()?;
    let target = head.symbolic_target()?;
    target.strip_prefix("refs/heads/").map(str::to_string)
}

/// Configured URL of the sync remote, if one exists.
pub fn remote_url(repo: &Repository) -> Option<String> {
    let remote = repo.find_remote(REMOTE_NAME).ok()?;
    remote.url().map(str::to_string)
}

/// Cheap working-tree summary for status displays. No network I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    pub dirty: bool,
    pub changed_count: usize,
}

/// Count files that differ from HEAD, including untracked files.
pub fn working_tree_status(repo: &Repository) -> Result<WorkingTreeStatus> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .exclude_submodules(true);

    let statuses = repo.statuses(Some(&mut opts))?;
    let changed_count = statuses
        .iter()
        .filter(|entry| entry.status() != Status::CURRENT)
        .count();

    Ok(WorkingTreeStatus {
        dirty: changed_count > 0,
        changed_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use vault_test_utils::{commit_file, init_repo};

    #[test]
    fn plain_directory_is_not_a_repo() {
        let dir = TempDir::new().unwrap();
        let state = inspect(dir.path());

        assert!(!state.is_repo);
        assert_eq!(state.branch, DEFAULT_BRANCH);
        assert_eq!(state.remote_url, None);
        assert_eq!(state.descriptor, None);
    }

    #[test]
    fn fresh_repo_reports_unborn_branch_name() {
        let dir = TempDir::new().unwrap();
        let _repo = init_repo(dir.path());

        let state = inspect(dir.path());
        assert!(state.is_repo);
        // No commits yet; the branch name comes from the symbolic HEAD.
        assert!(!state.branch.is_empty());
        assert_eq!(state.remote_url, None);
    }

    #[test]
    fn repo_with_supported_remote_resolves_descriptor() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        repo.remote(REMOTE_NAME, "https://github.com/alice/notes.git")
            .unwrap();

        let state = inspect(dir.path());
        assert_eq!(
            state.remote_url.as_deref(),
            Some("https://github.com/alice/notes.git")
        );
        assert_eq!(state.descriptor.unwrap().slug(), "alice/notes");
    }

    #[test]
    fn repo_with_unsupported_remote_has_no_descriptor() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        repo.remote(REMOTE_NAME, "https://gitlab.com/alice/notes.git")
            .unwrap();

        let state = inspect(dir.path());
        assert!(state.remote_url.is_some());
        assert_eq!(state.descriptor, None);
    }

    #[test]
    fn discovery_does_not_walk_into_parent_repos() {
        let dir = TempDir::new().unwrap();
        let _outer = init_repo(dir.path());
        let inner = dir.path().join("vault");
        std::fs::create_dir(&inner).unwrap();

        let state = inspect(&inner);
        assert!(!state.is_repo);
    }

    #[test]
    fn status_counts_untracked_and_modified_files() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "note.md", "# hello", "initial");

        let clean = working_tree_status(&repo).unwrap();
        assert_eq!(
            clean,
            WorkingTreeStatus {
                dirty: false,
                changed_count: 0
            }
        );

        std::fs::write(dir.path().join("note.md"), "# changed").unwrap();
        std::fs::write(dir.path().join("new.md"), "new").unwrap();

        let dirty = working_tree_status(&repo).unwrap();
        assert_eq!(
            dirty,
            WorkingTreeStatus {
                dirty: true,
                changed_count: 2
            }
        );
    }
}
