//! End-to-end provisioning scenarios over the session API.
//!
//! These exercise the full local story — init, remote linking, token
//! storage, config and status summaries — across crate boundaries.
//! Network-facing sync phases are covered in vault-git's transport
//! tests against local bare remotes.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use vault_core::{Error, VaultSession};
use vault_credentials::{MachineKeyCipher, TokenVault};

fn session_in(data_dir: &Path, vault: &Path) -> VaultSession {
    let cipher = MachineKeyCipher::load_or_create(&data_dir.join("machine.key")).unwrap();
    let store = TokenVault::new(data_dir.join("credentials.json"), Box::new(cipher));
    VaultSession::new(vault, store).unwrap()
}

#[test]
fn fresh_vault_provisioning_flow() {
    let data = TempDir::new().unwrap();
    let vault_dir = TempDir::new().unwrap();
    fs::write(vault_dir.path().join("note.md"), "# my notes\n").unwrap();

    let session = session_in(data.path(), vault_dir.path());

    // Nothing configured yet.
    let config = session.sync_config();
    assert!(!config.enabled);
    assert!(!config.is_repo);

    // Initialize: repository, ignore rules, initial commit.
    let outcome = session.init_repository().unwrap();
    assert!(!outcome.already_initialized);
    assert!(session.init_repository().unwrap().already_initialized);

    let ignore = fs::read_to_string(vault_dir.path().join(".gitignore")).unwrap();
    assert!(ignore.contains(".vaultsync/"));

    let config = session.sync_config();
    assert!(config.is_repo);
    assert!(!config.enabled);
    assert!(config.reason.unwrap().contains("no remote"));

    // Link a remote.
    let descriptor = session
        .set_remote("https://github.com/alice/notes.git")
        .unwrap();
    assert_eq!(descriptor.slug(), "alice/notes");

    let config = session.sync_config();
    assert!(!config.enabled);
    assert_eq!(config.repo_slug.as_deref(), Some("alice/notes"));
    assert!(config.reason.unwrap().contains("no token"));

    // Store a token: sync becomes available.
    session.set_token("ghp_secret").unwrap();
    let config = session.sync_config();
    assert!(config.enabled);
    assert!(config.has_token);
    assert_eq!(config.reason, None);

    // Initial commit captured the note, so the tree reports clean.
    let status = session.sync_status().unwrap();
    assert!(!status.dirty);
    assert_eq!(status.changed_count, 0);
    assert_eq!(status.last_sync, None);
}

#[test]
fn empty_vault_still_initializes_with_a_commit() {
    let data = TempDir::new().unwrap();
    let vault_dir = TempDir::new().unwrap();

    let session = session_in(data.path(), vault_dir.path());
    session.init_repository().unwrap();

    let repo = vault_git::open(vault_dir.path()).unwrap();
    assert!(repo.head().unwrap().peel_to_commit().is_ok());

    let status = session.sync_status().unwrap();
    assert!(!status.dirty);
}

#[test]
fn tokens_persist_across_sessions_and_stay_per_remote() {
    let data = TempDir::new().unwrap();

    let first_dir = TempDir::new().unwrap();
    let first = session_in(data.path(), first_dir.path());
    first.init_repository().unwrap();
    first
        .set_remote("https://github.com/alice/notes.git")
        .unwrap();
    first.set_token("alice-token").unwrap();

    let second_dir = TempDir::new().unwrap();
    let second = session_in(data.path(), second_dir.path());
    second.init_repository().unwrap();
    second
        .set_remote("https://github.com/bob/journal.git")
        .unwrap();
    second.set_token("bob-token").unwrap();

    // A brand-new session over the same store sees the saved token.
    let reopened = session_in(data.path(), first_dir.path());
    assert!(reopened.sync_config().has_token);

    // Each descriptor loads only its own token.
    let store = {
        let cipher = MachineKeyCipher::load_or_create(&data.path().join("machine.key")).unwrap();
        TokenVault::new(data.path().join("credentials.json"), Box::new(cipher))
    };
    let alice = vault_remote::resolve("https://github.com/alice/notes.git").unwrap();
    let bob = vault_remote::resolve("https://github.com/bob/journal.git").unwrap();
    assert_eq!(store.load(&alice).unwrap().as_deref(), Some("alice-token"));
    assert_eq!(store.load(&bob).unwrap().as_deref(), Some("bob-token"));
}

#[test]
fn clearing_the_token_disables_sync() {
    let data = TempDir::new().unwrap();
    let vault_dir = TempDir::new().unwrap();

    let session = session_in(data.path(), vault_dir.path());
    session.init_repository().unwrap();
    session
        .set_remote("https://github.com/alice/notes.git")
        .unwrap();
    session.set_token("ghp_secret").unwrap();
    assert!(session.sync_config().enabled);

    session.clear_token().unwrap();
    let config = session.sync_config();
    assert!(!config.enabled);
    assert!(!config.has_token);

    let mut session = session;
    let err = session.run_sync().unwrap_err();
    assert!(matches!(err, Error::NotConfigured { .. }));
}

#[test]
fn sync_refuses_before_any_configuration_exists() {
    let data = TempDir::new().unwrap();
    let vault_dir = TempDir::new().unwrap();

    let mut session = session_in(data.path(), vault_dir.path());
    let err = session.run_sync().unwrap_err();
    match err {
        Error::NotConfigured { reason } => {
            assert!(reason.contains("not under version control"));
        }
        other => panic!("expected NotConfigured, got {other:?}"),
    }

    // No credential store was created by the refused sync: the
    // precondition check runs before any credential access.
    assert!(!data.path().join("credentials.json").exists());
}

#[test]
fn repointing_the_remote_requires_a_new_token() {
    let data = TempDir::new().unwrap();
    let vault_dir = TempDir::new().unwrap();

    let session = session_in(data.path(), vault_dir.path());
    session.init_repository().unwrap();
    session
        .set_remote("https://github.com/alice/notes.git")
        .unwrap();
    session.set_token("alice-token").unwrap();
    assert!(session.sync_config().enabled);

    // Credentials follow remote identity, not the vault directory.
    session
        .set_remote("https://github.com/alice/archive.git")
        .unwrap();
    let config = session.sync_config();
    assert!(!config.enabled);
    assert!(!config.has_token);

    // Pointing back restores the original entitlement.
    session
        .set_remote("https://github.com/alice/notes.git")
        .unwrap();
    assert!(session.sync_config().enabled);
}
