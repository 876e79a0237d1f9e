//! Login and registration form validation.
//!
//! Runs before any provider call so obviously bad input never leaves the
//! device.

use std::fmt;

/// Provider-enforced minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidEmail,
    PasswordTooShort,
    PasswordMismatch,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail => write!(f, "Enter a valid email address"),
            ValidationError::PasswordTooShort => write!(
                f,
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ),
            ValidationError::PasswordMismatch => write!(f, "Passwords do not match"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validated email/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Trims and lower-cases an email, rejecting anything without a local part
/// and a dotted domain.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let normalized = email.trim().to_ascii_lowercase();
    let Some((local, domain)) = normalized.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || normalized.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(normalized)
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validates the login form.
///
/// # Errors
/// Returns the first failing rule.
pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let email = normalize_email(email)?;
    check_password(password)?;
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

/// Validates the registration form, including the confirmation field.
///
/// # Errors
/// Returns the first failing rule.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<Credentials, ValidationError> {
    let credentials = validate_login(email, password)?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Ana@Example.COM ").unwrap(),
            "ana@example.com"
        );
        for bad in ["", "ana", "@example.com", "ana@", "ana@example", "a@b@c.com", "a b@c.com"] {
            assert_eq!(normalize_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn test_login_requires_min_password() {
        assert_eq!(
            validate_login("ana@example.com", "12345"),
            Err(ValidationError::PasswordTooShort)
        );
        let creds = validate_login("ana@example.com", "123456").unwrap();
        assert_eq!(creds.password, "123456");
    }

    #[test]
    fn test_registration_requires_matching_confirmation() {
        assert_eq!(
            validate_registration("ana@example.com", "secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_registration("ana@example.com", "secret1", "secret1").is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = validate_login("ana@example.com", "secret1").unwrap();
        assert!(!format!("{creds:?}").contains("secret1"));
    }
}
