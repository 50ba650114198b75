//! Config and status command implementations

use std::path::Path;

use colored::Colorize;

use super::open_session;
use crate::error::Result;

/// Run the config command: a read-only sync summary.
pub fn run_config(vault: &Path, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let session = open_session(vault, data_dir)?;
    let config = session.sync_config();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Vault Sync Configuration".bold());
    println!();
    println!("{}:    {}", "Vault".dimmed(), vault.display());
    println!(
        "{}:     {}",
        "Repo".dimmed(),
        if config.is_repo {
            "initialized".green()
        } else {
            "not initialized".yellow()
        }
    );

    if let Some(remote_url) = &config.remote_url {
        println!("{}:   {}", "Remote".dimmed(), remote_url.cyan());
    }
    if let Some(slug) = &config.repo_slug {
        println!("{}:     {}", "Slug".dimmed(), slug.cyan());
    }
    if let Some(branch) = &config.branch {
        println!("{}:   {}", "Branch".dimmed(), branch.cyan());
    }
    println!(
        "{}:    {}",
        "Token".dimmed(),
        if config.has_token {
            "saved".green()
        } else {
            "none".yellow()
        }
    );
    println!();

    if config.enabled {
        println!("{} Sync is ready.", "OK".green().bold());
    } else if let Some(reason) = &config.reason {
        println!("{} Sync is disabled: {}", "--".yellow().bold(), reason);
        if !config.is_repo {
            println!("Run {} to initialize.", "vaultsync init".cyan());
        } else if config.repo_slug.is_none() {
            println!(
                "Run {} to link a repository.",
                "vaultsync set-remote <url>".cyan()
            );
        } else {
            println!("Run {} to store a token.", "vaultsync set-token".cyan());
        }
    }

    Ok(())
}

/// Run the status command: working-tree summary, no network I/O.
pub fn run_status(vault: &Path, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let session = open_session(vault, data_dir)?;
    let status = session.sync_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Vault Status".bold());
    println!();
    if status.dirty {
        println!(
            "{} {} changed file(s) waiting to sync",
            "=>".yellow().bold(),
            status.changed_count
        );
    } else {
        println!("{} Working tree clean", "OK".green().bold());
    }

    match status.last_sync {
        Some(at) => println!("{}: {}", "Last sync".dimmed(), at.to_rfc3339()),
        None => println!("{}: never (this session)", "Last sync".dimmed()),
    }

    Ok(())
}
