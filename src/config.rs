use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::AppError, storage::default_accounts_path};

/// Config file inside the user's config directory
const CONFIG_FILE: &str = "kickoff/config.json";
/// Allow-list file inside the developer directory
const ALLOW_LIST_FILE: &str = ".git-accounts";

/// Files rewritten with project values after the template is copied
pub const DEFAULT_CUSTOMIZE_FILES: [&str; 6] = [
    "CLAUDE.md",
    "README.md",
    ".cursorrules",
    "config/commands.md",
    "config/stack.md",
    "config/environment.md",
];

/// Technology stack labels written into template placeholders
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StackDefaults {
    pub package_manager: String,
    pub dev_command: String,
    pub language: String,
    pub runtime: String,
}

impl Default for StackDefaults {
    fn default() -> Self {
        Self {
            package_manager: "npm".to_string(),
            dev_command: "npm run dev".to_string(),
            language: "JavaScript/TypeScript".to_string(),
            runtime: "Node.js".to_string(),
        }
    }
}

/// Runtime configuration, read from `config.json` with defaults for missing fields
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Directory new projects are created in
    pub developer_dir: PathBuf,
    /// Template copied into every new project
    pub template_dir: PathBuf,
    /// Accounts document
    pub accounts_file: PathBuf,
    /// Allow-list file, `<developer_dir>/.git-accounts` when unset
    pub allow_list_file: Option<PathBuf>,
    /// Identity whose allow-list line receives new projects, the account key when unset
    pub allow_list_identity: Option<String>,
    /// Relative paths of files to customize
    pub customize_files: Vec<String>,
    pub stack: StackDefaults,
    pub commit_message: String,
    /// Upper bound for each git invocation
    pub git_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        let developer_dir = home.join("Developer");
        Self {
            template_dir: developer_dir.join("project-template-minimal"),
            developer_dir,
            accounts_file: default_accounts_path()
                .unwrap_or_else(|_| PathBuf::from("git-accounts.json")),
            allow_list_file: None,
            allow_list_identity: None,
            customize_files: DEFAULT_CUSTOMIZE_FILES.iter().map(|f| f.to_string()).collect(),
            stack: StackDefaults::default(),
            commit_message: "Initial setup: Claude & Cursor environment".to_string(),
            git_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Gets the default path to the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Loads config from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let file_contents = fs::read_to_string(path)?;
        if file_contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&file_contents)?)
    }

    pub fn allow_list_path(&self) -> PathBuf {
        self.allow_list_file
            .clone()
            .unwrap_or_else(|| self.developer_dir.join(ALLOW_LIST_FILE))
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }
}
