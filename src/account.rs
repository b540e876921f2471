use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{error::AppError, validation::validate_account};

/// Key of the account seeded into a fresh registry
pub const DEFAULT_ACCOUNT_KEY: &str = "default";

/// Git identity and remote connection details stored in the accounts file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Committer display name (user.name), also the owner segment of remote URLs
    pub name: String,
    /// Committer email (user.email)
    pub email: String,
    /// SSH host alias used when building remote URLs
    #[serde(rename = "ssh_host")]
    pub remote_host: String,
    /// Reference to the key used for `remote_host`, never read by kickoff
    #[serde(rename = "ssh_key")]
    pub key_ref: String,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        remote_host: impl Into<String>,
        key_ref: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            remote_host: remote_host.into(),
            key_ref: key_ref.into(),
        }
    }

    /// Copy with surrounding whitespace removed from every field
    fn trimmed(self) -> Self {
        Self::new(
            self.name.trim(),
            self.email.trim(),
            self.remote_host.trim(),
            self.key_ref.trim(),
        )
    }

    /// Builds the SSH remote URL for a project owned by this account
    pub fn remote_url(&self, project_name: &str) -> String {
        format!(
            "git@{}:{}/{}.git",
            self.remote_host, self.name, project_name
        )
    }
}

/// Mapping from account key to account, serialized as a JSON object
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccountRegistry {
    accounts: BTreeMap<String, Account>,
}

impl AccountRegistry {
    /// Registry holding only the seeded default account
    pub fn seeded() -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            DEFAULT_ACCOUNT_KEY.to_string(),
            Account::new(
                DEFAULT_ACCOUNT_KEY,
                "default@example.com",
                "github.com",
                "~/.ssh/id_ed25519",
            ),
        );
        Self { accounts }
    }

    pub fn get(&self, key: &str) -> Option<&Account> {
        self.accounts.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.accounts.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Account)> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Inserts or replaces the account stored under `key`
    ///
    /// # Arguments
    /// * `key` - Key the account is stored under afterwards
    /// * `account` - Fully filled account
    /// * `previous_key` - Key the account was stored under before, when renaming
    ///
    /// Key and fields are stored trimmed. Everything is validated before the map
    /// is touched, so a failed call leaves the registry unchanged and a rename
    /// never leaves both keys behind.
    pub fn upsert(
        &mut self,
        key: &str,
        account: Account,
        previous_key: Option<&str>,
    ) -> Result<(), AppError> {
        let key = key.trim();
        let account = account.trimmed();
        validate_account(key, &account)?;

        let renaming = previous_key.filter(|previous| *previous != key);
        if let Some(previous) = renaming {
            if !self.accounts.contains_key(previous) {
                return Err(AppError::AccountNotFound(previous.to_string()));
            }
            if self.accounts.contains_key(key) {
                return Err(AppError::Validation(format!(
                    "cannot rename '{previous}' to '{key}': account already exists"
                )));
            }
            self.accounts.remove(previous);
        }

        self.accounts.insert(key.to_string(), account);
        Ok(())
    }

    /// Deletes the account under `key`, returning it if it was present
    pub fn remove(&mut self, key: &str) -> Option<Account> {
        self.accounts.remove(key)
    }
}
