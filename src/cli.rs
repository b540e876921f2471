use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Config file (defaults to `<config dir>/kickoff/config.json`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Template directory to copy
    #[arg(long, global = true)]
    pub template: Option<PathBuf>,
    /// Directory new projects are created in
    #[arg(long, global = true)]
    pub developer_dir: Option<PathBuf>,
    /// Accounts file
    #[arg(long, global = true)]
    pub accounts_file: Option<PathBuf>,
    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Subcommand chosen to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a new project from the template
    New {
        /// Name of the project directory
        project_name: String,
        /// Account key to connect the project to (prompts when omitted)
        #[arg(short, long)]
        account: Option<String>,
    },
    /// Manages stored Git accounts
    #[command(subcommand)]
    Account(AccountCommands),
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Adds a new account
    Add {
        /// Unique account key
        key: String,
        /// Git email
        email: String,
        /// SSH host alias used in remote URLs
        remote_host: String,
        /// Reference to the SSH key for the host
        key_ref: String,
        /// Git username, defaults to the key
        #[arg(long)]
        name: Option<String>,
    },
    /// Edits or renames an account
    Edit(EditArgs),
    /// Deletes an account
    Remove {
        /// Key of account to delete
        key: String,
    },
    /// Displays all stored accounts
    List,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Key of account to edit
    pub key: String,
    /// New key for the account
    #[arg(long)]
    pub rename: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub remote_host: Option<String>,
    #[arg(long)]
    pub key_ref: Option<String>,
}
