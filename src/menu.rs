use colored::Colorize;
use inquire::Select;

use crate::{
    account::{Account, AccountRegistry},
    cli::EditArgs,
    commands::{add_account, edit_account, list_accounts, new_project, remove_account},
    config::Config,
    error::AppError,
    storage::AccountStore,
    validation::{
        prompt_until_valid, prompt_with_default, validate_input_email, validate_input_name,
        validate_project_name, validate_required,
    },
    BACK_OPTION,
};

/// Runs interactive menu interface
pub fn run_menu(config: &Config) -> Result<(), AppError> {
    let store = AccountStore::new(&config.accounts_file);

    loop {
        let actions: Vec<&'static str> = vec![
            "new project",
            "add account",
            "edit account",
            "remove account",
            "show all accounts",
            "quit",
        ];

        let action_selected: &'static str =
            Select::new(&format!("{}", "select action".blue()), actions).prompt()?;

        let result = match action_selected {
            "new project" => menu_new_project(config),
            "add account" => menu_add_account(&store),
            "edit account" => menu_edit_account(&store),
            "remove account" => menu_remove_account(&store),
            "show all accounts" => list_accounts(&store),
            "quit" => {
                println!("{}", "quitting".yellow());
                break Ok(());
            }
            _ => unreachable!("unexpected input"),
        };

        // Prompt cancellation ends the menu, other errors are reported and it continues
        match result {
            Err(err @ AppError::Inquire(_)) => break Err(err),
            Err(err) => println!("{}", err.to_string().red()),
            Ok(()) => {}
        }
    }
}

/// Menu for creating a project
fn menu_new_project(config: &Config) -> Result<(), AppError> {
    let project_name: String = prompt_until_valid(
        &format!("{}", "what name do you want for your new project?".blue()),
        |input| validate_project_name(input).map(|_| ()),
    )?;
    println!(
        "{} {}",
        "saving it in:".blue(),
        config.developer_dir.join(&project_name).display()
    );
    new_project(config, &project_name, None)
}

/// Menu for adding a new account
fn menu_add_account(store: &AccountStore) -> Result<(), AppError> {
    let registry: AccountRegistry = store.load_for_update()?;

    let key: String = prompt_until_valid(&format!("{}", "enter account key:".blue()), |input| {
        validate_input_name("account key", input)?;
        if registry.contains(input) {
            return Err(AppError::Validation("Account already exists".to_string()));
        }
        Ok(())
    })?;
    let account = prompt_account(&Account::new(key.clone(), "", "", ""))?;

    add_account(store, &key, account)
}

/// Menu for editing an account
fn menu_edit_account(store: &AccountStore) -> Result<(), AppError> {
    let registry: AccountRegistry = store.load_for_update()?;
    let Some(key) = select_account(&registry, "select account to edit:")? else {
        return Ok(());
    };
    let current = registry
        .get(&key)
        .cloned()
        .ok_or_else(|| AppError::AccountNotFound(key.clone()))?;

    let new_key: String =
        prompt_with_default(&format!("{}", "account key:".blue()), &key, |input| {
            validate_input_name("account key", input)
        })?;
    let updated = prompt_account(&current)?;

    edit_account(
        store,
        EditArgs {
            key: key.clone(),
            rename: (new_key != key).then_some(new_key),
            name: Some(updated.name),
            email: Some(updated.email),
            remote_host: Some(updated.remote_host),
            key_ref: Some(updated.key_ref),
        },
    )
}

/// Menu for deleting an account
fn menu_remove_account(store: &AccountStore) -> Result<(), AppError> {
    let registry: AccountRegistry = store.load_for_update()?;
    match select_account(&registry, "select account to delete:")? {
        Some(key) => remove_account(store, &key),
        None => Ok(()),
    }
}

/// Prompts for every account field, pre-filled from `current`
fn prompt_account(current: &Account) -> Result<Account, AppError> {
    let name = prompt_with_default(&format!("{}", "git username:".blue()), &current.name, |input| {
        validate_required("name", input)
    })?;
    let email = prompt_with_default(
        &format!("{}", "git email:".blue()),
        &current.email,
        validate_input_email,
    )?;
    let remote_host = prompt_with_default(
        &format!("{}", "ssh host:".blue()),
        &current.remote_host,
        |input| validate_required("remote host", input),
    )?;
    let key_ref = prompt_with_default(&format!("{}", "ssh key:".blue()), &current.key_ref, |input| {
        validate_required("key reference", input)
    })?;
    Ok(Account::new(name, email, remote_host, key_ref))
}

/// Lets the user pick an account, `None` when they chose to go back
fn select_account(registry: &AccountRegistry, prompt: &str) -> Result<Option<String>, AppError> {
    if registry.is_empty() {
        return Err(AppError::Validation("no accounts found".to_string()));
    }

    let selected: String =
        Select::new(&format!("{}", prompt.blue()), build_key_list(registry)).prompt()?;
    Ok((selected != BACK_OPTION).then_some(selected))
}

/// Builds list of account keys for menu to display
pub fn build_key_list(registry: &AccountRegistry) -> Vec<String> {
    let mut keys: Vec<String> = registry.keys();
    keys.push(BACK_OPTION.to_string());
    keys
}
