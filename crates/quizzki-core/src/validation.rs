//! Local form checks that run before any request is sent.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Minimum password length accepted by the login form.
pub const MIN_PASSWORD_LEN: usize = 3;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Check the login form. The first failing field wins.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::EmailInvalid);
    }
    if password.trim().is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_statement(statement: &str) -> Result<(), ValidationError> {
    if statement.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    Ok(())
}

pub fn validate_answer(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyAnswer);
    }
    Ok(())
}

pub fn validate_percentage(value: f64) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::PercentageOutOfRange);
    }
    Ok(())
}
