//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use super::open_session;
use crate::error::Result;

/// Run one sync cycle and report the steps performed.
pub fn run_sync(vault: &Path, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let mut session = open_session(vault, data_dir)?;

    if !json {
        println!("{} Syncing {}...", "=>".blue().bold(), vault.display());
    }

    let outcome = session.run_sync()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for step in &outcome.steps {
        println!("  {} {}", "+".green(), step);
    }
    println!(
        "{} Synced {} ({})",
        "OK".green().bold(),
        outcome.repo_slug.cyan(),
        outcome.branch.yellow()
    );
    Ok(())
}
