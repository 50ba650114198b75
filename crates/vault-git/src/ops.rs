//! Local repository operations: init, staging, commits, remote config.

use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature};

use crate::inspect::REMOTE_NAME;
use crate::Result;

/// Committer identity used when the repository has none configured.
///
/// Vaults often live on machines where the user never ran
/// `git config`, and a sync must not fail over a missing identity.
const FALLBACK_NAME: &str = "Vault Sync";
const FALLBACK_EMAIL: &str = "vaultsync@localhost";

/// Initialize a new repository at `path`.
pub fn init(path: &Path) -> Result<Repository> {
    Ok(Repository::init(path)?)
}

/// The committer signature, falling back to the engine identity.
pub fn signature(repo: &Repository) -> Result<Signature<'static>> {
    match repo.signature() {
        Ok(sig) => Ok(sig),
        Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
    }
}

/// Stage every change in the working tree: new files, modifications,
/// and deletions.
pub fn stage_all(repo: &Repository) -> Result<()> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()?;
    Ok(())
}

/// Commit the staged index with `message`.
///
/// Returns `None` without committing when the staged tree is identical
/// to HEAD — an empty cycle must not manufacture empty commits. The
/// very first commit of a repository is created even over an empty
/// tree, since a vault may legitimately start with zero trackable
/// files.
pub fn commit_index(repo: &Repository, message: &str) -> Result<Option<Oid>> {
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let sig = signature(repo)?;

    match repo.head() {
        Ok(head) => {
            let parent = head.peel_to_commit()?;
            if parent.tree_id() == tree_id {
                return Ok(None);
            }
            let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;
            Ok(Some(oid))
        }
        Err(_) => {
            let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])?;
            Ok(Some(oid))
        }
    }
}

/// Stage everything and commit it in one step.
pub fn commit_all(repo: &Repository, message: &str) -> Result<Option<Oid>> {
    stage_all(repo)?;
    commit_index(repo, message)
}

/// Point the sync remote at `url`, replacing any existing remote of
/// that name. Only one remote is ever configured in this design.
pub fn set_remote(repo: &Repository, url: &str) -> Result<()> {
    if repo.find_remote(REMOTE_NAME).is_ok() {
        repo.remote_set_url(REMOTE_NAME, url)?;
    } else {
        repo.remote(REMOTE_NAME, url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use vault_test_utils::init_repo;

    #[test]
    fn first_commit_is_created_even_with_empty_tree() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());

        let oid = commit_all(&repo, "vault init").unwrap();
        assert!(oid.is_some());

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("vault init"));
    }

    #[test]
    fn clean_tree_commits_nothing() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        std::fs::write(dir.path().join("note.md"), "# hello").unwrap();

        assert!(commit_all(&repo, "first").unwrap().is_some());
        assert_eq!(commit_all(&repo, "second").unwrap(), None);

        // Still exactly one commit.
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 0);
    }

    #[test]
    fn staging_picks_up_deletions() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        std::fs::write(dir.path().join("note.md"), "# hello").unwrap();
        commit_all(&repo, "first").unwrap();

        std::fs::remove_file(dir.path().join("note.md")).unwrap();
        let oid = commit_all(&repo, "second").unwrap();
        assert!(oid.is_some());

        let tree = repo.head().unwrap().peel_to_tree().unwrap();
        assert!(tree.get_name("note.md").is_none());
    }

    #[test]
    fn set_remote_replaces_existing_url() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());

        set_remote(&repo, "https://github.com/alice/old.git").unwrap();
        set_remote(&repo, "https://github.com/alice/new.git").unwrap();

        let remote = repo.find_remote(REMOTE_NAME).unwrap();
        assert_eq!(remote.url(), Some("https://github.com/alice/new.git"));
        assert_eq!(repo.remotes().unwrap().len(), 1);
    }
}
