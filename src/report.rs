use std::{fmt, path::PathBuf};

/// Non-fatal failure of a best-effort step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepWarning {
    /// Short step label, e.g. `git init` or `allow-list`
    pub step: String,
    pub message: String,
}

impl StepWarning {
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for StepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.message)
    }
}

/// Outcome of a successful project creation
#[derive(Debug, Clone)]
pub struct ProjectReport {
    /// Directory the project was created in
    pub path: PathBuf,
    /// Warnings collected from the best-effort stages
    pub warnings: Vec<StepWarning>,
}
