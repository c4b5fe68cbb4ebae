use crate::error::ValidationError;

/// Field validation shared by the services.
///
/// Lengths are counted in characters, not bytes, so non-ASCII names get the
/// same limits as ASCII ones.
pub const LOGIN_MIN_CHARS: usize = 2;
pub const LOGIN_MAX_CHARS: usize = 50;
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 100;

/// Validates a login
///
/// # Examples
///
/// ```rust
/// use mitter_core::validation::validate_login;
///
/// assert!(validate_login("alice").is_ok());
/// assert!(validate_login("a").is_err());
/// ```
pub fn validate_login(login: &str) -> Result<(), ValidationError> {
    if login.is_empty() {
        return Err(ValidationError::MissingField(
            "Login is required".to_string(),
        ));
    }

    let len = login.chars().count();
    if len < LOGIN_MIN_CHARS {
        return Err(ValidationError::InvalidLogin(format!(
            "Login must be at least {LOGIN_MIN_CHARS} characters long"
        )));
    }

    if len > LOGIN_MAX_CHARS {
        return Err(ValidationError::InvalidLogin(format!(
            "Login must be no more than {LOGIN_MAX_CHARS} characters long"
        )));
    }

    Ok(())
}

/// Validates a display name
///
/// # Examples
///
/// ```rust
/// use mitter_core::validation::validate_name;
///
/// assert!(validate_name("Alice").is_ok());
/// assert!(validate_name("  ").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::MissingField("Name is required".to_string()));
    }

    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(
            "Name cannot be empty or whitespace only".to_string(),
        ));
    }

    let len = name.chars().count();
    if len < NAME_MIN_CHARS {
        return Err(ValidationError::InvalidName(format!(
            "Name must be at least {NAME_MIN_CHARS} characters long"
        )));
    }

    if len > NAME_MAX_CHARS {
        return Err(ValidationError::InvalidName(format!(
            "Name must be no more than {NAME_MAX_CHARS} characters long"
        )));
    }

    Ok(())
}

/// Validates a password according to the account requirements
///
/// - Minimum 8 characters
/// - Maximum 100 characters
///
/// Whitespace counts like any other character.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    let len = password.chars().count();
    if len < PASSWORD_MIN_CHARS {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters long"
        )));
    }

    if len > PASSWORD_MAX_CHARS {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be no more than {PASSWORD_MAX_CHARS} characters long"
        )));
    }

    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::InvalidContent(
            "Content cannot be empty".to_string(),
        ));
    }

    Ok(())
}
