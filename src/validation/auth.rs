use crate::error::{AppError, Result};

/// Validates an email address.
///
/// # Arguments
///
/// * `email` - The email to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the email is plausible.
pub fn validate_email(email: &str) -> Result<()> {
    if email.len() < 3 || email.len() > 255 {
        return Err(AppError::Validation(
            "Email must be between 3 and 255 characters".to_string(),
        ));
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation(
            "Email address is not valid".to_string(),
        ));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(
            "Email must not contain whitespace".to_string(),
        ));
    }

    Ok(())
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a first or last name.
pub fn validate_name(name: &str, field: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }

    if name.len() > 100 {
        return Err(AppError::Validation(format!(
            "{} must be at most 100 characters",
            field
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        assert!(validate_email("kai@garage.example").is_ok());
        assert!(validate_email("a.b+c@sub.domain.example").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@domain.example").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user name@domain.example").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn names_must_be_nonempty() {
        assert!(validate_name("Kai", "First name").is_ok());
        assert!(validate_name("   ", "First name").is_err());
    }
}
