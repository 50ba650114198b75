//! Remote repository identity parsing
//!
//! A vault syncs against exactly one hosted remote. This crate turns a
//! configured remote URL into a structured [`RemoteDescriptor`] when the
//! URL points at the supported host, and `None` otherwise. Many vaults
//! legitimately have no remote (or one we do not support), so a failed
//! resolution is a normal outcome rather than an error.

use serde::Serialize;

/// The single hosting provider the engine knows how to talk to.
pub const SUPPORTED_HOST: &str = "github.com";

/// Parsed identity of a remote repository.
///
/// Immutable once resolved. Owner and repository name preserve the case
/// of the input URL (the host displays them case-sensitively even though
/// it matches them case-insensitively); lookups use [`credential_key`],
/// which is fully lowercased.
///
/// [`credential_key`]: RemoteDescriptor::credential_key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteDescriptor {
    /// Hosting provider host name, lowercased.
    pub host: String,
    /// Repository owner (user or organization), case preserved.
    pub owner: String,
    /// Repository name without any `.git` suffix, case preserved.
    pub repo_name: String,
    /// The URL the descriptor was resolved from, as given.
    pub raw_url: String,
}

impl RemoteDescriptor {
    /// Display identity: `owner/repo`, case preserved.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo_name)
    }

    /// Credential store key: `host/owner/repo`, lowercased.
    pub fn credential_key(&self) -> String {
        format!("{}/{}/{}", self.host, self.owner, self.repo_name).to_lowercase()
    }

    /// Canonical HTTPS clone URL for this repository.
    pub fn https_url(&self) -> String {
        format!("https://{}/{}/{}.git", self.host, self.owner, self.repo_name)
    }
}

/// Resolve a remote URL into a [`RemoteDescriptor`].
///
/// Accepts exactly two shapes, both restricted to [`SUPPORTED_HOST`]:
///
/// - HTTPS: `https://github.com/owner/repo[.git]`
/// - SSH shorthand: `git@github.com:owner/repo[.git]`
///
/// Host matching is case-insensitive; a trailing `.git` is stripped.
/// Anything else — other hosts, other schemes, malformed paths, empty
/// input — yields `None`.
pub fn resolve(url: &str) -> Option<RemoteDescriptor> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (host, path) = if let Some(rest) = strip_scheme(trimmed, "https://") {
        rest.split_once('/')?
    } else if let Some(rest) = trimmed.strip_prefix("git@") {
        rest.split_once(':')?
    } else {
        return None;
    };

    if !host.eq_ignore_ascii_case(SUPPORTED_HOST) {
        return None;
    }

    let (owner, repo_name) = parse_owner_repo(path)?;

    Some(RemoteDescriptor {
        host: host.to_ascii_lowercase(),
        owner: owner.to_string(),
        repo_name: repo_name.to_string(),
        raw_url: trimmed.to_string(),
    })
}

/// Strip a URL scheme prefix, matching it case-insensitively.
fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    if url.len() >= scheme.len() && url[..scheme.len()].eq_ignore_ascii_case(scheme) {
        Some(&url[scheme.len()..])
    } else {
        None
    }
}

/// Split `owner/repo[.git]` into its two segments.
///
/// Both segments must be non-empty and free of further separators; a
/// single trailing slash is tolerated since remotes are often pasted
/// from browser address bars.
fn parse_owner_repo(path: &str) -> Option<(&str, &str)> {
    let path = path.trim_end_matches('/');
    let (owner, repo) = path.split_once('/')?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    if !is_valid_segment(owner) || !is_valid_segment(repo) {
        return None;
    }

    Some((owner, repo))
}

fn is_valid_segment(segment: &str) -> bool {
    segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
