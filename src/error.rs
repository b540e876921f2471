use std::path::PathBuf;

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization
    #[error("json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Destination project directory is already present
    #[error("project already exists: '{}'", .0.display())]
    AlreadyExists(PathBuf),
    /// Template directory could not be found
    #[error("template directory not found: '{}'", .0.display())]
    TemplateMissing(PathBuf),
    /// Template could not be copied into the new project
    #[error("failed to copy template entry '{}': {reason}", path.display())]
    CopyFailure { path: PathBuf, reason: String },
    /// Placeholder substitution failed for a customizable file
    #[error("failed to customize '{}': {reason}", path.display())]
    Substitution { path: PathBuf, reason: String },
    /// Account document could not be written
    #[error("failed to persist accounts to '{}': {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },
    /// External command failed, timed out or could not be spawned
    #[error("{step} failed: {reason}")]
    ExternalTool { step: String, reason: String },
    /// Error when specific account key is not found.
    #[error("account not found: '{0}'")]
    AccountNotFound(String),
}

impl AppError {
    pub fn copy_failure(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CopyFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn substitution(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Substitution {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn external_tool(step: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExternalTool {
            step: step.into(),
            reason: reason.to_string(),
        }
    }
}
