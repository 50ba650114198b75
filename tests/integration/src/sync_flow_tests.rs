//! The sync protocol composed end to end over a local bare remote.
//!
//! Two working directories play two machines editing the same vault.
//! Each "cycle" here walks the orchestrator's phase order — commit,
//! fetch, integrate, push — through the public plumbing API, which is
//! as far as a network-free test can drive the protocol: the real
//! orchestrator insists on a hosted-remote descriptor before it will
//! touch a repository.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use vault_git::{
    IntegrationOutcome, RemoteTip, commit_all, current_branch, fetch_branch, integrate_remote,
    push_branch, transport::NETWORK_TIMEOUT,
};
use vault_test_utils::{clone_repo, init_bare, init_repo};

/// One protocol cycle in orchestrator order. Returns whether each
/// phase did work: (committed, integrated, pushed is implicit).
fn run_cycle(repo: &git2::Repository, url: &str, branch: &str) -> (bool, IntegrationOutcome) {
    let committed = commit_all(repo, "vault sync 2024-06-01 12:00:00")
        .unwrap()
        .is_some();

    let integration = match fetch_branch(repo, url, branch, NETWORK_TIMEOUT).unwrap() {
        RemoteTip::Missing => IntegrationOutcome::UpToDate,
        RemoteTip::At(oid) => integrate_remote(repo, branch, oid).unwrap(),
    };

    push_branch(repo, url, branch).unwrap();
    (committed, integration)
}

fn read(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap()
}

#[test]
fn two_machines_converge_through_the_cycle() {
    let remote_tmp = TempDir::new().unwrap();
    let remote_dir = remote_tmp.path().join("vault.git");
    init_bare(&remote_dir);
    let url = remote_dir.to_string_lossy().into_owned();

    // Machine A starts the vault and pushes the first cycle.
    let a_dir = TempDir::new().unwrap();
    let a = init_repo(a_dir.path());
    fs::write(a_dir.path().join("note.md"), "written on A\n").unwrap();
    let branch = current_branch(&a);

    let (committed, _) = run_cycle(&a, &url, &branch);
    assert!(committed);

    // Machine B joins, edits a different file, cycles.
    let b_dir = TempDir::new().unwrap();
    let b = clone_repo(remote_dir.as_path(), b_dir.path());
    fs::write(b_dir.path().join("journal.md"), "written on B\n").unwrap();
    let (committed, integration) = run_cycle(&b, &url, &branch);
    assert!(committed);
    assert_eq!(integration, IntegrationOutcome::UpToDate);

    // A edits concurrently with B's push, then cycles: its commit is
    // replayed on top of B's history and both files land everywhere.
    fs::write(a_dir.path().join("note.md"), "updated on A\n").unwrap();
    let (committed, integration) = run_cycle(&a, &url, &branch);
    assert!(committed);
    assert_eq!(integration, IntegrationOutcome::Rebased { replayed: 1 });
    assert_eq!(read(a_dir.path(), "journal.md"), "written on B\n");

    // B cycles with a clean tree and just fast-forwards.
    let (committed, integration) = run_cycle(&b, &url, &branch);
    assert!(!committed);
    assert_eq!(integration, IntegrationOutcome::FastForwarded);
    assert_eq!(read(b_dir.path(), "note.md"), "updated on A\n");

    // Converged: same tip on both machines and on the remote.
    let a_tip = a.head().unwrap().target().unwrap();
    let b_tip = b.head().unwrap().target().unwrap();
    assert_eq!(a_tip, b_tip);
}

#[test]
fn repeated_cycles_without_changes_are_no_ops() {
    let remote_tmp = TempDir::new().unwrap();
    let remote_dir = remote_tmp.path().join("vault.git");
    init_bare(&remote_dir);
    let url = remote_dir.to_string_lossy().into_owned();

    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    fs::write(dir.path().join("note.md"), "hello\n").unwrap();
    let branch = current_branch(&repo);

    run_cycle(&repo, &url, &branch);
    let tip_after_first = repo.head().unwrap().target().unwrap();

    // Nothing changed locally or remotely: no commit, no movement.
    let (committed, integration) = run_cycle(&repo, &url, &branch);
    assert!(!committed);
    assert_eq!(integration, IntegrationOutcome::UpToDate);
    assert_eq!(repo.head().unwrap().target().unwrap(), tip_after_first);
}
