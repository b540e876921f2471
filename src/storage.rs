use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{account::AccountRegistry, error::AppError};

/// Accounts file in user's home directory
const ACCOUNTS_FILE: &str = "git-accounts.json";

/// Gets the default path to the accounts file
pub fn default_accounts_path() -> Result<PathBuf, AppError> {
    let home_dir: PathBuf = dirs::home_dir()
        .ok_or_else(|| AppError::Validation("failed to find the home directory".to_string()))?;
    Ok(home_dir.join(ACCOUNTS_FILE))
}

/// Loads and persists the account registry as a pretty-printed JSON document
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the seeded registry when no document exists yet
    ///
    /// Returns `Some` with the seeded registry when the file was created,
    /// `None` when a document was already present.
    pub fn initialize_if_absent(&self) -> Result<Option<AccountRegistry>, AppError> {
        if self.path.exists() {
            return Ok(None);
        }

        let registry = AccountRegistry::seeded();
        self.save(&registry)?;
        info!(path = %self.path.display(), "created accounts file with default account");
        Ok(Some(registry))
    }

    /// Loads the registry
    ///
    /// A missing document is created with the seeded default. A corrupt or
    /// unreadable document yields the seeded default in memory and is left on
    /// disk untouched.
    pub fn load(&self) -> Result<AccountRegistry, AppError> {
        if let Some(registry) = self.initialize_if_absent()? {
            return Ok(registry);
        }

        match self.read() {
            Ok(registry) => {
                debug!(path = %self.path.display(), accounts = registry.len(), "loaded accounts");
                Ok(registry)
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "accounts file unreadable, using default account"
                );
                Ok(AccountRegistry::seeded())
            }
        }
    }

    /// Loads the registry for a read-modify-save cycle
    ///
    /// Unlike [`AccountStore::load`], a corrupt or unreadable document is an
    /// error, so saving the result can never replace recoverable accounts
    /// with the default.
    pub fn load_for_update(&self) -> Result<AccountRegistry, AppError> {
        if let Some(registry) = self.initialize_if_absent()? {
            return Ok(registry);
        }

        self.read().map_err(|err| {
            AppError::persistence(
                &self.path,
                format!("accounts file is unreadable, fix or remove it first ({err})"),
            )
        })
    }

    fn read(&self) -> Result<AccountRegistry, AppError> {
        let file_contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&file_contents)?)
    }

    /// Saves the full registry, replacing the previous document
    pub fn save(&self, registry: &AccountRegistry) -> Result<(), AppError> {
        let json: String = serde_json::to_string_pretty(registry)
            .map_err(|err| AppError::persistence(&self.path, err))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| AppError::persistence(&self.path, err))?;
        }
        fs::write(&self.path, json).map_err(|err| AppError::persistence(&self.path, err))?;
        debug!(path = %self.path.display(), accounts = registry.len(), "saved accounts");
        Ok(())
    }
}
