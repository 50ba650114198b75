//! Shared test fixtures for the vault-sync workspace.
//!
//! Git repositories at the realism levels the test suites need,
//! including local bare "remotes" so fetch/rebase/push paths run
//! without any network. Built entirely on `git2` so the suite does not
//! require a `git` binary on the machine. Dev-dependency only — never
//! published.

use std::fs;
use std::path::Path;

use git2::{Oid, Repository, Signature};

/// Initialise a real repository with a committer identity configured.
///
/// Identity lives in the repository-local config so tests never depend
/// on (or pollute) the machine's global git configuration.
///
/// # Panics
/// Panics if any git operation fails.
pub fn init_repo(path: &Path) -> Repository {
    let repo = Repository::init(path)
        .unwrap_or_else(|e| panic!("init_repo: failed to init at {}: {e}", path.display()));
    {
        let mut config = repo.config().expect("init_repo: failed to open config");
        config
            .set_str("user.name", "Test User")
            .expect("init_repo: failed to set user.name");
        config
            .set_str("user.email", "test@test.com")
            .expect("init_repo: failed to set user.email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("init_repo: failed to disable gpgsign");
    }
    repo
}

/// Initialise a bare repository to act as a local "remote".
///
/// # Panics
/// Panics if `git2::Repository::init_bare` fails.
pub fn init_bare(path: &Path) -> Repository {
    Repository::init_bare(path)
        .unwrap_or_else(|e| panic!("init_bare: failed to init at {}: {e}", path.display()))
}

/// Clone a local repository (typically a bare remote) into `dest`.
///
/// # Panics
/// Panics if the clone fails.
pub fn clone_repo(source: &Path, dest: &Path) -> Repository {
    let repo = Repository::clone(&source.to_string_lossy(), dest)
        .unwrap_or_else(|e| panic!("clone_repo: failed to clone {}: {e}", source.display()));
    {
        let mut config = repo.config().expect("clone_repo: failed to open config");
        config
            .set_str("user.name", "Test User")
            .expect("clone_repo: failed to set user.name");
        config
            .set_str("user.email", "test@test.com")
            .expect("clone_repo: failed to set user.email");
    }
    repo
}

/// Write `content` to `rel_path` inside the repository's working tree
/// and commit it.
///
/// Creates parent directories as needed. The commit's parent is the
/// current HEAD, or none for the first commit.
///
/// # Panics
/// Panics if any filesystem or git operation fails.
pub fn commit_file(repo: &Repository, rel_path: &str, content: &str, message: &str) -> Oid {
    let workdir = repo
        .workdir()
        .expect("commit_file: repository has no working tree");
    let full_path = workdir.join(rel_path);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).expect("commit_file: failed to create parent directories");
    }
    fs::write(&full_path, content).expect("commit_file: failed to write file");

    let mut index = repo.index().expect("commit_file: failed to open index");
    index
        .add_path(Path::new(rel_path))
        .expect("commit_file: failed to stage file");
    index.write().expect("commit_file: failed to write index");

    let tree_id = index.write_tree().expect("commit_file: failed to write tree");
    let tree = repo
        .find_tree(tree_id)
        .expect("commit_file: failed to find tree");
    let sig = test_signature();

    let parents: Vec<git2::Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("commit_file: bad HEAD")],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("commit_file: failed to commit")
}

fn test_signature() -> Signature<'static> {
    Signature::now("Test User", "test@test.com").expect("test_signature: failed to build")
}
