//! Provisioning commands: init, set-remote, create-repo

use std::path::Path;

use colored::Colorize;
use dialoguer::Password;

use super::open_session;
use crate::error::Result;

/// Run the init command.
pub fn run_init(vault: &Path, data_dir: Option<&Path>) -> Result<()> {
    let session = open_session(vault, data_dir)?;
    let outcome = session.init_repository()?;

    if outcome.already_initialized {
        println!(
            "{} Vault is already under version control",
            "OK".green().bold()
        );
    } else {
        println!(
            "{} Initialized vault repository at {}",
            "OK".green().bold(),
            vault.display()
        );
    }
    Ok(())
}

/// Run the set-remote command.
pub fn run_set_remote(vault: &Path, data_dir: Option<&Path>, url: &str) -> Result<()> {
    let session = open_session(vault, data_dir)?;
    let descriptor = session.set_remote(url)?;

    println!(
        "{} Linked vault to {}",
        "OK".green().bold(),
        descriptor.slug().cyan()
    );
    println!(
        "Run {} to store an access token.",
        "vaultsync set-token".cyan()
    );
    Ok(())
}

/// Run the create-repo command.
///
/// Prompts for the token when it was not passed as a flag, so it never
/// has to appear in shell history.
pub fn run_create_repo(
    vault: &Path,
    data_dir: Option<&Path>,
    name: &str,
    private: bool,
    token: Option<String>,
) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => Password::new().with_prompt("GitHub token").interact()?,
    };

    let session = open_session(vault, data_dir)?;

    println!(
        "{} Creating {} repository {}...",
        "=>".blue().bold(),
        if private { "private" } else { "public" },
        name.cyan()
    );

    let created = session.create_remote_repository(&token, name, private)?;

    println!(
        "{} Created and linked {}",
        "OK".green().bold(),
        created.descriptor.slug().cyan()
    );
    println!("{}: {}", "Clone URL".dimmed(), created.clone_url);
    println!("Run {} to push the vault.", "vaultsync sync".cyan());
    Ok(())
}
