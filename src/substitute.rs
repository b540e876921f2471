use std::{fs, path::Path};

use tracing::{debug, info};

use crate::{account::Account, config::StackDefaults, error::AppError};

pub const PROJECT_NAME_TOKEN: &str = "[PROJECT_NAME]";
pub const PROJECT_DESCRIPTION_TOKEN: &str = "[PROJECT_DESCRIPTION]";
pub const REPOSITORY_URL_TOKEN: &str = "[REPOSITORY_URL]";
pub const PACKAGE_MANAGER_TOKEN: &str = "[PACKAGE_MANAGER]";
pub const DEV_COMMAND_TOKEN: &str = "[DEV_COMMAND]";
pub const LANGUAGE_TOKEN: &str = "[LANGUAGE]";
pub const RUNTIME_TOKEN: &str = "[RUNTIME]";

/// Ordered placeholder to value pairs, applied as literal replacements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    entries: Vec<(String, String)>,
}

impl TokenTable {
    /// Builds the table for a new project owned by `account`
    pub fn for_project(project_name: &str, account: &Account, stack: &StackDefaults) -> Self {
        Self::default()
            .with(PROJECT_NAME_TOKEN, project_name)
            .with(PROJECT_DESCRIPTION_TOKEN, format!("{project_name} - A new project"))
            .with(REPOSITORY_URL_TOKEN, account.remote_url(project_name))
            .with(PACKAGE_MANAGER_TOKEN, &stack.package_manager)
            .with(DEV_COMMAND_TOKEN, &stack.dev_command)
            .with(LANGUAGE_TOKEN, &stack.language)
            .with(RUNTIME_TOKEN, &stack.runtime)
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((token.into(), value.into()));
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every token in `text`, in table order
    pub fn apply(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token.as_str(), value))
    }
}

/// Rewrites the customizable files below `dest_root` with `tokens`
///
/// Files missing from the project are skipped. Every present file is read and
/// written back, even when no token matched. Returns the number of files
/// rewritten.
///
/// # Errors
/// `Substitution` when a listed path is not a regular file or cannot be read
/// as UTF-8 text or written back.
pub fn rewrite<S: AsRef<str>>(
    dest_root: &Path,
    files: &[S],
    tokens: &TokenTable,
) -> Result<usize, AppError> {
    let mut rewritten = 0;

    for relative in files {
        let path = dest_root.join(relative.as_ref());
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = relative.as_ref(), "not in template, skipping");
                continue;
            }
            Err(err) => return Err(AppError::substitution(&path, err)),
        };
        if !metadata.is_file() {
            return Err(AppError::substitution(&path, "not a regular file"));
        }

        let content = fs::read_to_string(&path).map_err(|err| AppError::substitution(&path, err))?;
        fs::write(&path, tokens.apply(&content)).map_err(|err| AppError::substitution(&path, err))?;
        rewritten += 1;
        debug!(file = relative.as_ref(), "customized");
    }

    info!(dest = %dest_root.display(), files = rewritten, "customized project files");
    Ok(rewritten)
}
