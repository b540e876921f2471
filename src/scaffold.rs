use std::{fs, path::PathBuf};

use tracing::{info, warn};

use crate::{
    account::AccountRegistry,
    allowlist,
    config::Config,
    error::AppError,
    git::{self, CommandRunner, InitOptions},
    report::ProjectReport,
    substitute::{self, TokenTable},
    template,
    validation::validate_project_name,
};

/// Project name and account chosen by the user
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub project_name: String,
    pub account_key: String,
}

impl ProjectRequest {
    pub fn new(project_name: impl Into<String>, account_key: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            account_key: account_key.into(),
        }
    }
}

/// Creates a project from the template and wires it to the requested account
///
/// Validation, name collisions, a missing template, copy failures and
/// customization failures abort the request. Allow-list registration and Git
/// set up are best effort; their problems come back as warnings in the report.
pub fn create_project<R: CommandRunner>(
    config: &Config,
    registry: &AccountRegistry,
    request: &ProjectRequest,
    runner: &R,
) -> Result<ProjectReport, AppError> {
    let project_name = validate_project_name(&request.project_name)?;
    let account = registry.get(&request.account_key).ok_or_else(|| {
        AppError::Validation(format!("unknown account '{}'", request.account_key))
    })?;
    let project_path: PathBuf = config.developer_dir.join(&project_name);

    info!(project = %project_name, account = %request.account_key, "creating project");
    template::materialize(&config.template_dir, &project_path)?;

    let tokens = TokenTable::for_project(&project_name, account, &config.stack);
    if let Err(err) = substitute::rewrite(&project_path, &config.customize_files, &tokens) {
        // Remove the half-customized copy so the name stays free.
        if let Err(cleanup) = fs::remove_dir_all(&project_path) {
            warn!(
                path = %project_path.display(),
                error = %cleanup,
                "failed to remove project after error"
            );
        }
        return Err(err);
    }

    let mut warnings = Vec::new();

    let identity = config
        .allow_list_identity
        .as_deref()
        .unwrap_or(&request.account_key);
    if let Err(warning) = allowlist::register(&config.allow_list_path(), identity, &project_name) {
        warnings.push(warning);
    }

    let options = InitOptions {
        account,
        project_name: &project_name,
        commit_message: &config.commit_message,
    };
    warnings.extend(git::initialize(runner, &project_path, &options));

    info!(
        path = %project_path.display(),
        warnings = warnings.len(),
        "project created"
    );
    Ok(ProjectReport {
        path: project_path,
        warnings,
    })
}
