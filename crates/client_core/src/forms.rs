use zeroize::Zeroize;

use crate::{AuthClient, AuthError, Registration, GENERIC_FAILURE_MESSAGE};

/// The message a screen renders for a failed action. Local validation and
/// server rejections carry user-facing text already; transport failures
/// collapse to the generic retry prompt.
fn rendered_message(err: &AuthError) -> String {
    match err {
        AuthError::Validation(message)
        | AuthError::Authentication(message)
        | AuthError::Registration(message)
        | AuthError::PasswordReset(message) => message.clone(),
        _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

/// Draft state for the sign-in screen. Field contents survive a failed
/// attempt so the visitor can correct and resubmit; the password draft is
/// wiped once a submission succeeds.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, client: &AuthClient) -> bool {
        self.error = None;
        match client.login(&self.email, &self.password).await {
            Ok(()) => {
                self.password.zeroize();
                true
            }
            Err(err) => {
                self.error = Some(rendered_message(&err));
                false
            }
        }
    }
}

/// Draft state for the create-account screen.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
    error: Option<String>,
}

impl RegisterForm {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, client: &AuthClient) -> bool {
        self.error = None;
        let registration = Registration {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            terms_accepted: self.terms_accepted,
        };
        match client.register(registration).await {
            Ok(()) => {
                self.password.zeroize();
                self.confirm_password.zeroize();
                true
            }
            Err(err) => {
                self.error = Some(rendered_message(&err));
                false
            }
        }
    }
}

/// Draft state for the forgot-password screen. After a submit exactly one of
/// `message` (confirmation) or `error` is set.
#[derive(Debug, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
    message: Option<String>,
    error: Option<String>,
}

impl ForgotPasswordForm {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, client: &AuthClient) -> bool {
        self.message = None;
        self.error = None;
        match client.request_password_reset(&self.email).await {
            Ok(confirmation) => {
                self.message = Some(confirmation);
                true
            }
            Err(err) => {
                self.error = Some(rendered_message(&err));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
