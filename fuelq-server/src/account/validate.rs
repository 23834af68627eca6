//! Signup form checks.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Characters of which a password needs at least one.
const SPECIAL_CHARS: &str = "@$!%*?&";

/// Minimum password length.
const MIN_PASSWORD_LEN: usize = 8;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

/// Fields of the signup form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// The first problem found with a signup form. The message is shown to the
/// user as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignupIssue {
    #[error("Name is required.")]
    NameRequired,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Password must contain at least one uppercase letter.")]
    PasswordNoUppercase,
    #[error("Password must contain at least one lowercase letter.")]
    PasswordNoLowercase,
    #[error("Password must contain at least one number.")]
    PasswordNoDigit,
    #[error("Password must contain at least one special character (@$!%*?&).")]
    PasswordNoSpecial,
    #[error("Passwords do not match. Please try again.")]
    PasswordMismatch,
}

/// Check a signup form. Checks run in a fixed order and the first failure
/// is reported.
pub fn validate_signup(form: &SignupForm) -> Result<(), SignupIssue> {
    if form.name.trim().is_empty() {
        return Err(SignupIssue::NameRequired);
    }
    if !looks_like_email(&form.email) {
        return Err(SignupIssue::InvalidEmail);
    }
    check_password(&form.password)?;
    if form.password != form.confirm_password {
        return Err(SignupIssue::PasswordMismatch);
    }
    Ok(())
}

/// Password strength rules.
pub fn check_password(password: &str) -> Result<(), SignupIssue> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SignupIssue::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(SignupIssue::PasswordNoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(SignupIssue::PasswordNoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(SignupIssue::PasswordNoDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(SignupIssue::PasswordNoSpecial);
    }
    Ok(())
}

/// Loose email shape: somewhere in the text a non-blank run of the form
/// `x@y.z`.
pub fn looks_like_email(s: &str) -> bool {
    EMAIL.is_match(s)
}
