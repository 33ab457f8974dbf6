/// Input validators for signup and task payloads
///
/// No password strength rules are applied; the only password check is the
/// bcrypt input limit, past which bcrypt would silently truncate.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MAX_USERNAME_LENGTH: usize = 64;
const MAX_ROLE_LENGTH: usize = 32;
const MAX_PASSWORD_BYTES: usize = 72;
const MAX_TITLE_LENGTH: usize = 256;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

pub const DEFAULT_ROLE: &str = "user";

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.@-]+$").unwrap();
    static ref ROLE_REGEX: Regex = Regex::new(r"^[a-z_]+$").unwrap();
}

/// Trimmed username of 1-64 characters from `[A-Za-z0-9_.@-]`
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Role name, defaulting to `user` when absent
pub fn is_valid_role(role: Option<&str>) -> Result<String, ValidationError> {
    let role = match role.map(str::trim) {
        None => return Ok(DEFAULT_ROLE.to_string()),
        Some(role) => role,
    };

    if role.is_empty() {
        return Err(ValidationError::EmptyField("role".to_string()));
    }

    if role.len() > MAX_ROLE_LENGTH {
        return Err(ValidationError::TooLong("role".to_string(), MAX_ROLE_LENGTH));
    }

    if !ROLE_REGEX.is_match(role) {
        return Err(ValidationError::InvalidFormat("role".to_string()));
    }

    Ok(role.to_string())
}

pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES));
    }
    Ok(())
}

pub fn is_valid_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("title".to_string()));
    }

    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong("title".to_string(), MAX_TITLE_LENGTH));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat("title".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Blank descriptions are stored as absent
pub fn is_valid_description(description: Option<&str>) -> Result<Option<String>, ValidationError> {
    let trimmed = match description.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };

    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong(
            "description".to_string(),
            MAX_DESCRIPTION_LENGTH,
        ));
    }

    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert_eq!(is_valid_username("alice").unwrap(), "alice");
        assert_eq!(is_valid_username("  bob.smith  ").unwrap(), "bob.smith");
        assert!(is_valid_username("jane_doe-99@corp").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert_eq!(
            is_valid_username("   "),
            Err(ValidationError::EmptyField("username".to_string()))
        );
        assert!(is_valid_username("has space").is_err());
        assert!(is_valid_username("semi;colon").is_err());
        assert!(is_valid_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(is_valid_role(None).unwrap(), DEFAULT_ROLE);
        assert_eq!(is_valid_role(Some("admin")).unwrap(), "admin");
        assert!(is_valid_role(Some("")).is_err());
        assert!(is_valid_role(Some("Admin!")).is_err());
    }

    #[test]
    fn test_password_only_checks_bcrypt_limit() {
        assert!(is_valid_password("").is_ok());
        assert!(is_valid_password("pw123").is_ok());
        assert!(is_valid_password(&"x".repeat(72)).is_ok());
        assert!(is_valid_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn test_title_and_description() {
        assert_eq!(is_valid_title(" Learn Rust ").unwrap(), "Learn Rust");
        assert!(is_valid_title("").is_err());
        assert!(is_valid_title("tab\there").is_err());
        assert!(is_valid_title(&"t".repeat(MAX_TITLE_LENGTH + 1)).is_err());

        assert_eq!(is_valid_description(None).unwrap(), None);
        assert_eq!(is_valid_description(Some("  ")).unwrap(), None);
        assert_eq!(
            is_valid_description(Some("End-to-end coding")).unwrap(),
            Some("End-to-end coding".to_string())
        );
        assert!(is_valid_description(Some(&"d".repeat(MAX_DESCRIPTION_LENGTH + 1))).is_err());
    }
}
