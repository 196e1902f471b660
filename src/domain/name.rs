//! Name validation for environments and deployments
//!
//! Both kinds of name share one rule: non-empty, ASCII alphanumerics plus
//! `-` and `_`. Invalid names are rejected wherever they enter the state
//! document; they are never trimmed or coerced.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NameError {
    #[error("Invalid environment name '{0}'. Names may only contain alphanumerics, '-' and '_'")]
    InvalidEnvironmentName(String),

    #[error("Invalid deployment name '{0}'. Names may only contain alphanumerics, '-' and '_'")]
    InvalidDeploymentName(String),
}

fn is_valid(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Checks an environment name, returning it unchanged when valid
pub fn validate_environment_name(name: &str) -> Result<&str, NameError> {
    if is_valid(name) {
        Ok(name)
    } else {
        Err(NameError::InvalidEnvironmentName(name.to_string()))
    }
}

/// Checks a deployment name, returning it unchanged when valid
pub fn validate_deployment_name(name: &str) -> Result<&str, NameError> {
    if is_valid(name) {
        Ok(name)
    } else {
        Err(NameError::InvalidDeploymentName(name.to_string()))
    }
}
