//! Input validation for values entered at the prompt.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Value too long: max {max}, got {actual}")]
    ValueTooLong { max: usize, actual: usize },
}

/// Validate a username (alphanumeric + underscore/hyphen, max 64 chars).
///
/// The username doubles as a filename stem, so anything that could alter the
/// storage path is rejected.
pub fn validate_username(name: &str) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidFormat(
            "Username cannot be empty".to_string(),
        ));
    }

    if name.len() > 64 {
        return Err(ValidationError::ValueTooLong {
            max: 64,
            actual: name.len(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::InvalidFormat(
            "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    Ok(name.to_string())
}
