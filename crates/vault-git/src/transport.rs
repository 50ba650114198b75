//! Remote transfer operations: fetch, history integration, push.
//!
//! All operations here take the remote URL as an argument and talk to
//! an anonymous in-memory remote. Credentials ride inside the URL for
//! the duration of a single call and are never written to the
//! repository's configuration.

use std::time::{Duration, Instant};

use git2::build::CheckoutBuilder;
use git2::{
    AnnotatedCommit, ErrorCode, FetchOptions, Oid, PushOptions, RebaseOptions, RemoteCallbacks,
    Repository,
};

use crate::ops::signature;
use crate::{Error, Result};

/// Bound on a single remote transfer. A stuck transfer surfaces as a
/// timeout error instead of blocking the caller indefinitely.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(30);

/// What a branch fetch found on the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteTip {
    /// The remote does not have the branch yet. Normal for a freshly
    /// created remote repository that has never been pushed to.
    Missing,
    /// Tip commit of the remote branch.
    At(Oid),
}

/// Fetch `branch` from `url`, bounded by `timeout`.
///
/// A missing remote branch is reported as [`RemoteTip::Missing`], not
/// an error; transport failures and exceeded deadlines are errors.
pub fn fetch_branch(
    repo: &Repository,
    url: &str,
    branch: &str,
    timeout: Duration,
) -> Result<RemoteTip> {
    let mut remote = repo.remote_anonymous(url)?;

    let deadline = Instant::now() + timeout;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |_| Instant::now() < deadline);

    let mut opts = FetchOptions::new();
    opts.remote_callbacks(callbacks);

    let refspec = format!("refs/heads/{branch}");
    if let Err(e) = remote.fetch(&[&refspec], Some(&mut opts), None) {
        if is_missing_branch(&e) {
            return Ok(RemoteTip::Missing);
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout {
                seconds: timeout.as_secs(),
            });
        }
        return Err(Error::FetchFailed {
            message: e.message().to_string(),
        });
    }

    // An empty remote fetches successfully but produces no FETCH_HEAD.
    let Ok(fetch_head) = repo.find_reference("FETCH_HEAD") else {
        return Ok(RemoteTip::Missing);
    };
    let commit = fetch_head
        .peel_to_commit()
        .map_err(|e| Error::FetchFailed {
            message: format!("could not resolve FETCH_HEAD: {}", e.message()),
        })?;

    Ok(RemoteTip::At(commit.id()))
}

fn is_missing_branch(e: &git2::Error) -> bool {
    if e.code() == ErrorCode::NotFound {
        return true;
    }
    let message = e.message().to_lowercase();
    message.contains("not found") || message.contains("no match") || message.contains("couldn't find")
}

/// How local history was reconciled with a fetched remote tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationOutcome {
    /// Local history already contains the remote tip.
    UpToDate,
    /// Local branch was fast-forwarded to the remote tip.
    FastForwarded,
    /// Local commits were replayed on top of the remote tip.
    Rebased { replayed: usize },
}

/// Bring `branch` up to date with a fetched remote tip, keeping history
/// linear.
///
/// Fast-forwards when local history is strictly behind; otherwise
/// replays local commits on top of the remote tip. Merge commits are
/// never created: a vault is expected to have a single writer per
/// repository, so true conflicts are rare and a linear history is far
/// easier to reason about than merge topology.
pub fn integrate_remote(repo: &Repository, branch: &str, remote_tip: Oid) -> Result<IntegrationOutcome> {
    let annotated = repo.find_annotated_commit(remote_tip)?;
    let (analysis, _) = repo.merge_analysis(&[&annotated])?;

    if analysis.is_up_to_date() {
        return Ok(IntegrationOutcome::UpToDate);
    }

    if analysis.is_fast_forward() || analysis.is_unborn() {
        fast_forward(repo, branch, remote_tip)?;
        return Ok(IntegrationOutcome::FastForwarded);
    }

    let replayed = rebase_onto(repo, branch, &annotated)?;
    Ok(IntegrationOutcome::Rebased { replayed })
}

/// Move the branch ref to `target` and check it out.
fn fast_forward(repo: &Repository, branch: &str, target: Oid) -> Result<()> {
    let refname = format!("refs/heads/{branch}");
    match repo.find_reference(&refname) {
        Ok(mut reference) => {
            reference.set_target(target, &format!("sync: fast-forward to {target}"))?;
        }
        // Unborn local branch: create it directly at the remote tip.
        Err(_) => {
            repo.reference(&refname, target, true, "sync: branch created at remote tip")?;
        }
    }
    repo.set_head(&refname)?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
    Ok(())
}

/// Replay the local commits of `branch` on top of `onto`.
///
/// On a conflict the on-disk rebase state is left in place and a
/// [`Error::RebaseConflict`] is returned; the orchestrator owns the
/// abort so that cleanup happens on every failure path, not just this
/// one.
fn rebase_onto(repo: &Repository, branch: &str, onto: &AnnotatedCommit) -> Result<usize> {
    let refname = format!("refs/heads/{branch}");
    let branch_ref = repo.find_reference(&refname)?;
    let local = repo.reference_to_annotated_commit(&branch_ref)?;

    let mut opts = RebaseOptions::new();
    let mut rebase = repo.rebase(Some(&local), Some(onto), None, Some(&mut opts))?;
    let committer = signature(repo)?;

    let mut replayed = 0;
    while let Some(operation) = rebase.next() {
        operation?;

        let index = repo.index()?;
        if index.has_conflicts() {
            let path = first_conflict_path(&index);
            return Err(Error::RebaseConflict { path });
        }

        match rebase.commit(None, &committer, None) {
            Ok(_) => replayed += 1,
            // The commit's changes are already present upstream.
            Err(e) if e.code() == ErrorCode::Applied => {}
            Err(e) => return Err(e.into()),
        }
    }

    rebase.finish(Some(&committer))?;
    Ok(replayed)
}

fn first_conflict_path(index: &git2::Index) -> String {
    index
        .conflicts()
        .ok()
        .and_then(|mut conflicts| conflicts.next())
        .and_then(|conflict| conflict.ok())
        .and_then(|conflict| conflict.our.or(conflict.their).or(conflict.ancestor))
        .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Abort any rebase left in progress. Idempotent: a repository with no
/// rebase under way is a no-op, so every failure path can call this
/// unconditionally.
pub fn abort_rebase_if_any(repo: &Repository) -> Result<bool> {
    match repo.state() {
        git2::RepositoryState::Rebase
        | git2::RepositoryState::RebaseInteractive
        | git2::RepositoryState::RebaseMerge => {
            let mut rebase = repo.open_rebase(None)?;
            rebase.abort()?;
            tracing::warn!("aborted in-progress rebase");
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Push `branch` to `url`.
///
/// A rejected reference update (non-fast-forward on the remote side)
/// surfaces through the push callback as [`Error::PushFailed`].
pub fn push_branch(repo: &Repository, url: &str, branch: &str) -> Result<()> {
    let mut remote = repo.remote_anonymous(url)?;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!("{refname}: {message}"))),
        None => Ok(()),
    });

    let mut opts = PushOptions::new();
    opts.remote_callbacks(callbacks);

    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    remote
        .push(&[&refspec], Some(&mut opts))
        .map_err(|e| Error::PushFailed {
            message: e.message().to_string(),
        })?;

    Ok(())
}
