//! Vault Sync CLI
//!
//! Thin command-line surface over the vault sync engine. Every
//! command opens a session for the selected vault and maps
//! one-to-one onto a session operation.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let vault = cli.vault;
    let data_dir = cli.data_dir.as_deref();
    match cli.command {
        Some(Commands::Config { json }) => commands::run_config(&vault, data_dir, json),
        Some(Commands::Status { json }) => commands::run_status(&vault, data_dir, json),
        Some(Commands::Init) => commands::run_init(&vault, data_dir),
        Some(Commands::SetRemote { url }) => commands::run_set_remote(&vault, data_dir, &url),
        Some(Commands::CreateRepo {
            name,
            private,
            token,
        }) => commands::run_create_repo(&vault, data_dir, &name, private, token),
        Some(Commands::SetToken { token }) => commands::run_set_token(&vault, data_dir, token),
        Some(Commands::ClearToken) => commands::run_clear_token(&vault, data_dir),
        Some(Commands::Sync { json }) => commands::run_sync(&vault, data_dir, json),
        None => {
            println!("{} Vault Sync CLI", "vaultsync".green().bold());
            println!();
            println!("Run {} for available commands.", "vaultsync --help".cyan());
            Ok(())
        }
    }
}
