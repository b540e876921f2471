use colored::Colorize;
use inquire::Text;
use validator::ValidateEmail;

use crate::{account::Account, error::AppError, BACK_OPTION};

/// Maximum length for account keys
const MAX_NAME_LENGTH: usize = 50;
/// Maximum length for Git email address
const MAX_EMAIL_LENGTH: usize = 100;

/// Prompts user for input until valid input is provided
pub fn prompt_until_valid<F>(prompt_message: &str, input_validation: F) -> Result<String, AppError>
where
    F: Fn(&str) -> Result<(), AppError>,
{
    loop {
        let input: String = Text::new(prompt_message).prompt()?;
        let input = input.trim().to_string();
        match input_validation(&input) {
            Ok(_) => break Ok(input),
            Err(AppError::Validation(msg)) => println!("{}", msg.red()),
            Err(e) => return Err(e),
        }
    }
}

/// Prompts with a pre-filled value, used when editing an existing account
pub fn prompt_with_default<F>(
    prompt_message: &str,
    default: &str,
    input_validation: F,
) -> Result<String, AppError>
where
    F: Fn(&str) -> Result<(), AppError>,
{
    loop {
        let input: String = Text::new(prompt_message).with_initial_value(default).prompt()?;
        let input = input.trim().to_string();
        match input_validation(&input) {
            Ok(_) => break Ok(input),
            Err(AppError::Validation(msg)) => println!("{}", msg.red()),
            Err(e) => return Err(e),
        }
    }
}

/// Validates that a required field is filled
pub fn validate_required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{field} cannot be empty")))
    } else {
        Ok(())
    }
}

/// Validates an account key or display name
pub fn validate_input_name(field: &str, name: &str) -> Result<(), AppError> {
    validate_required(field, name)?;
    if name.len() > MAX_NAME_LENGTH {
        Err(AppError::Validation(format!(
            "{field} too long (max {MAX_NAME_LENGTH} characters)"
        )))
    } else if name == BACK_OPTION {
        Err(AppError::Validation(format!("{field} cannot be '{BACK_OPTION}'")))
    } else {
        Ok(())
    }
}

/// Validates email input
pub fn validate_input_email(email: &str) -> Result<(), AppError> {
    validate_required("email", email)?;
    if email.len() > MAX_EMAIL_LENGTH {
        Err(AppError::Validation(format!(
            "email too long, max {MAX_EMAIL_LENGTH} characters"
        )))
    } else if !email.validate_email() {
        Err(AppError::Validation("Invalid email format".to_string()))
    } else {
        Ok(())
    }
}

/// Validates every field of an account before it enters the registry
pub fn validate_account(key: &str, account: &Account) -> Result<(), AppError> {
    validate_input_name("account key", key)?;
    validate_required("name", &account.name)?;
    validate_input_email(&account.email)?;
    validate_required("remote host", &account.remote_host)?;
    validate_required("key reference", &account.key_ref)?;
    Ok(())
}

/// Validates a project name and returns it trimmed
///
/// Names that would resolve outside the developer directory are rejected.
pub fn validate_project_name(project_name: &str) -> Result<String, AppError> {
    let name = project_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("project name cannot be empty".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(AppError::Validation(format!(
            "invalid project name '{name}': must be a single directory name"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_is_trimmed() {
        assert_eq!(validate_project_name("  demo ").unwrap(), "demo");
    }

    #[test]
    fn empty_or_escaping_project_names_are_rejected() {
        for name in ["", "   ", ".", "..", "a/b", "..\\x"] {
            assert!(
                matches!(validate_project_name(name), Err(AppError::Validation(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn account_requires_valid_email() {
        let account = Account::new("alice", "not-an-email", "gh-alice", "~/.ssh/id");
        assert!(matches!(
            validate_account("alice", &account),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn back_is_not_a_valid_key() {
        assert!(validate_input_name("account key", BACK_OPTION).is_err());
    }

    #[test]
    fn display_name_is_free_form() {
        let long_name = "A".repeat(MAX_NAME_LENGTH + 10);
        for name in [BACK_OPTION, long_name.as_str(), "Alice O'Neil"] {
            let account = Account::new(name, "alice@example.com", "gh-alice", "~/.ssh/id");
            assert!(validate_account("alice", &account).is_ok(), "{name:?} should be accepted");
        }
        let blank = Account::new(" ", "alice@example.com", "gh-alice", "~/.ssh/id");
        assert!(validate_account("alice", &blank).is_err());
    }
}
