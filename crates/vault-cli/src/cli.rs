//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vault Sync - Keep a local note vault in sync with its GitHub repository
#[derive(Parser, Debug)]
#[command(name = "vaultsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Vault directory to operate on
    #[arg(long, global = true, default_value = ".")]
    pub vault: PathBuf,

    /// Override the credential store directory (defaults to the
    /// platform data directory)
    #[arg(long, global = true, env = "VAULTSYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the vault's sync configuration
    Config {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show working-tree status and the last sync time
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Bring the vault under version control
    ///
    /// Creates the repository, seeds an ignore file, and makes the
    /// initial commit. Safe to run twice.
    Init,

    /// Link the vault to a GitHub repository
    ///
    /// Examples:
    ///   vaultsync set-remote https://github.com/alice/notes.git
    ///   vaultsync set-remote git@github.com:alice/notes
    SetRemote {
        /// Repository URL (HTTPS or SSH shorthand)
        url: String,
    },

    /// Create a new GitHub repository and link it to the vault
    CreateRepo {
        /// Name for the new repository
        name: String,

        /// Create the repository as private
        #[arg(long)]
        private: bool,

        /// Access token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Store an access token for the vault's remote
    SetToken {
        /// The token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Remove the stored token for the vault's remote
    ClearToken,

    /// Run one sync cycle: commit, fetch, rebase, push
    Sync {
        /// Output the result as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
