use crate::{AuthError, Registration};

pub(crate) const MSG_EMAIL_REQUIRED: &str = "Please enter your email";
pub(crate) const MSG_PASSWORD_REQUIRED: &str = "Please enter your password";
pub(crate) const MSG_FIELDS_REQUIRED: &str = "All fields are required";
pub(crate) const MSG_EMAIL_FORMAT: &str = "Invalid email format";
pub(crate) const MSG_PASSWORD_LENGTH: &str = "Password must be at least 8 characters";
pub(crate) const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub(crate) const MSG_TERMS_REQUIRED: &str = "You must accept the terms and conditions";

const PASSWORD_MIN_CHARS: usize = 8;

/// Checks run in a fixed order and stop at the first failure, so a draft
/// with several problems reports only the earliest one.
pub(crate) fn registration(reg: &Registration) -> Result<(), AuthError> {
    if reg.name.is_empty()
        || reg.email.is_empty()
        || reg.password.is_empty()
        || reg.confirm_password.is_empty()
    {
        return Err(AuthError::Validation(MSG_FIELDS_REQUIRED.to_string()));
    }
    if !is_valid_email(&reg.email) {
        return Err(AuthError::Validation(MSG_EMAIL_FORMAT.to_string()));
    }
    if reg.password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AuthError::Validation(MSG_PASSWORD_LENGTH.to_string()));
    }
    if reg.password != reg.confirm_password {
        return Err(AuthError::Validation(MSG_PASSWORD_MISMATCH.to_string()));
    }
    if !reg.terms_accepted {
        return Err(AuthError::Validation(MSG_TERMS_REQUIRED.to_string()));
    }
    Ok(())
}

/// `local@domain.tld`: one `@`, no whitespace, non-empty local part, and a
/// domain with at least one dot and something on both sides of it.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
