use colored::Colorize;
use inquire::Select;

use crate::{
    account::Account,
    cli::{Cli, EditArgs},
    config::Config,
    error::AppError,
    git::ProcessRunner,
    report::ProjectReport,
    scaffold::{create_project, ProjectRequest},
    storage::AccountStore,
};

/// Builds the effective config from the config file and CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    if let Some(developer_dir) = &cli.developer_dir {
        config.developer_dir = developer_dir.clone();
    }
    if let Some(template) = &cli.template {
        config.template_dir = template.clone();
    }
    if let Some(accounts_file) = &cli.accounts_file {
        config.accounts_file = accounts_file.clone();
    }
    Ok(config)
}

/// Creates a project, prompting for the account when none was given
pub fn new_project(
    config: &Config,
    project_name: &str,
    account: Option<String>,
) -> Result<(), AppError> {
    let store = AccountStore::new(&config.accounts_file);
    let registry = store.load()?;

    let account_key = match account {
        Some(key) => key,
        None => {
            Select::new(&format!("{}", "select account:".blue()), registry.keys()).prompt()?
        }
    };

    let request = ProjectRequest::new(project_name, account_key);
    let runner = ProcessRunner::new(config.git_timeout());
    let report = create_project(config, &registry, &request, &runner)?;
    print_report(&report);
    Ok(())
}

/// Prints the outcome of a created project
pub fn print_report(report: &ProjectReport) {
    println!("{} {}", "project created at:".green(), report.path.display());
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }
    println!("{}", "next steps:".blue());
    println!("  cd {}", report.path.display());
}

/// Adds a new account and saves the registry
pub fn add_account(store: &AccountStore, key: &str, account: Account) -> Result<(), AppError> {
    let mut registry = store.load_for_update()?;
    if registry.contains(key.trim()) {
        return Err(AppError::Validation(format!(
            "account '{}' already exists",
            key.trim()
        )));
    }
    registry.upsert(key, account, None)?;
    store.save(&registry)?;
    println!("{} {}", "account added:".green(), key.trim());
    Ok(())
}

/// Applies the given changes to an account, renaming it when requested
pub fn edit_account(store: &AccountStore, args: EditArgs) -> Result<(), AppError> {
    let mut registry = store.load_for_update()?;
    let current = registry
        .get(&args.key)
        .cloned()
        .ok_or_else(|| AppError::AccountNotFound(args.key.clone()))?;

    let updated = Account {
        name: args.name.unwrap_or(current.name),
        email: args.email.unwrap_or(current.email),
        remote_host: args.remote_host.unwrap_or(current.remote_host),
        key_ref: args.key_ref.unwrap_or(current.key_ref),
    };
    let new_key = args.rename.unwrap_or_else(|| args.key.clone());

    registry.upsert(&new_key, updated, Some(&args.key))?;
    store.save(&registry)?;
    println!("{} {}", "account updated:".green(), new_key.trim());
    Ok(())
}

/// Deletes an account and saves the registry
pub fn remove_account(store: &AccountStore, key: &str) -> Result<(), AppError> {
    let mut registry = store.load_for_update()?;
    if registry.remove(key).is_none() {
        println!("{} {}", "no account named".yellow(), key);
        return Ok(());
    }
    store.save(&registry)?;
    println!("{} {}", "account deleted:".green(), key);
    Ok(())
}

/// Lists every stored account
pub fn list_accounts(store: &AccountStore) -> Result<(), AppError> {
    let registry = store.load()?;
    if registry.is_empty() {
        println!("{}", "no accounts to show".red());
        return Ok(());
    }

    for (key, account) in registry.iter() {
        println!(
            "{} {} <{}> via {} ({})",
            key.blue(),
            account.name,
            account.email,
            account.remote_host,
            account.key_ref
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::account::DEFAULT_ACCOUNT_KEY;

    fn alice() -> Account {
        Account::new("alice", "alice@example.com", "gh-alice", "~/.ssh/id_alice")
    }

    #[test]
    fn add_then_rename_persists_single_key() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = AccountStore::new(temp.path().join("accounts.json"));

        add_account(&store, "alice", alice()).unwrap();
        edit_account(
            &store,
            EditArgs {
                key: "alice".to_string(),
                rename: Some("alice-work".to_string()),
                name: None,
                email: Some("alice@work.example.com".to_string()),
                remote_host: None,
                key_ref: None,
            },
        )
        .unwrap();

        let registry = store.load().unwrap();
        assert!(!registry.contains("alice"));
        let renamed = registry.get("alice-work").unwrap();
        assert_eq!(renamed.email, "alice@work.example.com");
        assert_eq!(renamed.remote_host, "gh-alice");
        assert!(registry.contains(DEFAULT_ACCOUNT_KEY));
    }

    #[test]
    fn adding_duplicate_key_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = AccountStore::new(temp.path().join("accounts.json"));

        add_account(&store, "alice", alice()).unwrap();
        let result = add_account(&store, "alice", alice());

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn editing_missing_account_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = AccountStore::new(temp.path().join("accounts.json"));

        let result = edit_account(
            &store,
            EditArgs {
                key: "ghost".to_string(),
                rename: None,
                name: None,
                email: None,
                remote_host: None,
                key_ref: None,
            },
        );

        assert!(matches!(result, Err(AppError::AccountNotFound(_))));
    }

    #[test]
    fn removing_missing_account_is_noop() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = AccountStore::new(temp.path().join("accounts.json"));

        remove_account(&store, "ghost").unwrap();

        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn mutations_leave_corrupt_accounts_file_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("accounts.json");
        let corrupt = r#"{ "work": { "name": "work", "email": "work@example.com""#;
        fs::write(&path, corrupt).unwrap();
        let store = AccountStore::new(&path);

        let added = add_account(&store, "alice", alice());
        let removed = remove_account(&store, "work");

        assert!(matches!(added, Err(AppError::Persistence { .. })));
        assert!(matches!(removed, Err(AppError::Persistence { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupt);
    }
}
