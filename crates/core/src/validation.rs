//! Field validators for account forms, usable from `#[validate(custom(...))]`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateEmail, ValidationError};

/// Maximum username length.
pub const MAX_USERNAME_LEN: usize = 150;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// Usernames: 1-150 characters of letters, digits and `@ . + - _`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len == 0 {
        return Err(error("required", "This field is required."));
    }
    if len > MAX_USERNAME_LEN {
        return Err(error(
            "max_length",
            "Ensure this value has at most 150 characters.",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(error(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Passwords: at least [`MIN_PASSWORD_LEN`] characters and not all digits.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(error(
            "password_too_short",
            "This password is too short. It must contain at least 8 characters.",
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(error(
            "password_entirely_numeric",
            "This password is entirely numeric.",
        ));
    }
    Ok(())
}

/// Email addresses are optional, but a non-blank value must be well formed.
pub fn validate_email_or_blank(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(error("invalid_email", "Enter a valid email address."))
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}
