//! Scaffolds new projects from a template and wires them to a Git account.
//!
//! The engine copies the template, fills in placeholders, registers the
//! project in the allow-list file and initializes a Git repository. Accounts
//! live in a JSON document managed through [`storage::AccountStore`].

pub mod account;
pub mod allowlist;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod menu;
pub mod report;
pub mod scaffold;
pub mod storage;
pub mod substitute;
pub mod template;
pub mod validation;

pub use account::{Account, AccountRegistry};
pub use config::Config;
pub use error::AppError;
pub use report::{ProjectReport, StepWarning};
pub use scaffold::{create_project, ProjectRequest};
pub use storage::AccountStore;

/// Menu entry for returning to the previous menu
pub const BACK_OPTION: &str = "back";
