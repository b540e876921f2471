use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use kickoff::{
    cli::{AccountCommands, Cli, Commands},
    commands::{add_account, edit_account, list_accounts, load_config, new_project, remove_account},
    logging,
    menu::run_menu,
    Account, AccountStore, AppError,
};

// Main
fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    let store = AccountStore::new(&config.accounts_file);

    match cli.command {
        Some(Commands::New { project_name, account }) => {
            new_project(&config, &project_name, account)
        }
        Some(Commands::Account(AccountCommands::Add {
            key,
            email,
            remote_host,
            key_ref,
            name,
        })) => {
            let name = name.unwrap_or_else(|| key.clone());
            add_account(&store, &key, Account::new(name, email, remote_host, key_ref))
        }
        Some(Commands::Account(AccountCommands::Edit(args))) => edit_account(&store, args),
        Some(Commands::Account(AccountCommands::Remove { key })) => remove_account(&store, &key),
        Some(Commands::Account(AccountCommands::List)) => list_accounts(&store),
        None => run_menu(&config),
    }
}
