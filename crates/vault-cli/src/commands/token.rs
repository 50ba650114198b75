//! Token commands: set-token, clear-token

use std::path::Path;

use colored::Colorize;
use dialoguer::Password;

use super::open_session;
use crate::error::Result;

/// Run the set-token command.
pub fn run_set_token(vault: &Path, data_dir: Option<&Path>, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => Password::new().with_prompt("GitHub token").interact()?,
    };

    let session = open_session(vault, data_dir)?;
    let descriptor = session.set_token(&token)?;

    println!(
        "{} Token saved for {}",
        "OK".green().bold(),
        descriptor.slug().cyan()
    );
    Ok(())
}

/// Run the clear-token command.
pub fn run_clear_token(vault: &Path, data_dir: Option<&Path>) -> Result<()> {
    let session = open_session(vault, data_dir)?;
    session.clear_token()?;

    println!("{} Token cleared", "OK".green().bold());
    Ok(())
}
