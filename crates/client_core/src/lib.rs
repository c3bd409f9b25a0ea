use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::UserProfile,
    error::ErrorBody,
    protocol::{
        CurrentUserResponse, LoginRequest, LoginResponse, PasswordResetRequest,
        PasswordResetResponse, RegisterRequest,
    },
};
use storage::{StoredToken, TokenStore};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub mod forms;
pub mod nav;
pub mod session;
mod validate;

pub use session::{Session, SessionStore};

/// Fixed name under which the opaque login token is persisted.
pub const AUTH_TOKEN_KEY: &str = "token";

const LOGIN_FALLBACK_MESSAGE: &str = "Invalid email or password";
const REGISTRATION_FALLBACK_MESSAGE: &str = "Failed to create an account";
const RESET_CONFIRMATION_MESSAGE: &str = "Check your email for a password reset link.";
pub(crate) const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Registration(String),
    #[error("{0}")]
    PasswordReset(String),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid server url: {0}")]
    InvalidServerUrl(#[from] url::ParseError),
}

/// Registration draft as submitted by the create-account screen. Lives only
/// for the duration of the submission.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
}

/// Fallback collaborator when no durable storage is wired in. Persisting
/// through it fails; the auth client downgrades that to a warning.
pub struct MissingTokenStore;

#[async_trait]
impl TokenStore for MissingTokenStore {
    async fn store_token(&self, name: &str, _token: &str) -> anyhow::Result<()> {
        Err(anyhow!("token storage unavailable for {name}"))
    }

    async fn load_token(&self, name: &str) -> anyhow::Result<Option<String>> {
        Err(anyhow!("token storage unavailable for {name}"))
    }

    async fn load_token_record(&self, name: &str) -> anyhow::Result<Option<StoredToken>> {
        Err(anyhow!("token storage unavailable for {name}"))
    }

    async fn clear_token(&self, name: &str) -> anyhow::Result<()> {
        Err(anyhow!("token storage unavailable for {name}"))
    }
}

/// Performs the authentication operations against the storefront API and
/// translates each outcome into session-store mutations plus a typed result
/// for the calling form.
///
/// The HTTP client carries a cookie store; the session cookie set by the
/// login endpoint is what authenticates the current-user and logout calls.
pub struct AuthClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    pub fn new(
        server_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Result<Self, AuthError> {
        Self::new_with_token_store(server_url, session, Arc::new(MissingTokenStore))
    }

    pub fn new_with_token_store(
        server_url: impl Into<String>,
        session: Arc<SessionStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, AuthError> {
        let server_url = server_url.into();
        Url::parse(&server_url)?;
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: server_url.trim_end_matches('/').to_string(),
            session,
            tokens,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Signs in with the given credentials. On success the session store is
    /// authenticated; on rejection it is left untouched and the server's
    /// message (or a generic fallback) is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() {
            return Err(AuthError::Validation(
                validate::MSG_EMAIL_REQUIRED.to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::Validation(
                validate::MSG_PASSWORD_REQUIRED.to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{}/api/login", self.base_url))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let message = rejection_message(response, LOGIN_FALLBACK_MESSAGE).await;
            return Err(AuthError::Authentication(message));
        }

        let body: LoginResponse = response.json().await?;
        if let Some(token) = &body.token {
            // The cookie session is authoritative; the token is only kept
            // for the legacy non-cookie transport and never re-sent here.
            if let Err(err) = self.tokens.store_token(AUTH_TOKEN_KEY, token).await {
                warn!("auth: failed to persist legacy token: {err}");
            }
        }
        match body.user {
            Some(user) => {
                info!("auth: login succeeded for user {}", user.id.0);
                self.session.set_authenticated(user).await;
            }
            None => {
                // Token-only response; the profile comes from the
                // credentialed current-user endpoint instead.
                self.refresh_from_server().await;
            }
        }
        Ok(())
    }

    /// Creates an account and establishes its session in one pipeline:
    /// register, then login with the same credentials, then refresh the
    /// profile snapshot. A failure after the register call is surfaced even
    /// though the account already exists server-side; nothing is rolled
    /// back.
    pub async fn register(&self, registration: Registration) -> Result<(), AuthError> {
        validate::registration(&registration)?;

        let response = self
            .http
            .post(format!("{}/api/register", self.base_url))
            .json(&RegisterRequest {
                name: registration.name.clone(),
                email: registration.email.clone(),
                password: registration.password.clone(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let message = rejection_message(response, REGISTRATION_FALLBACK_MESSAGE).await;
            return Err(AuthError::Registration(message));
        }

        info!("auth: account created, establishing session");
        self.login(&registration.email, &registration.password)
            .await?;
        self.refresh_from_server().await;
        Ok(())
    }

    /// Ends the session. Client-authoritative: the store and the persisted
    /// token are cleared no matter what the endpoint answers.
    pub async fn logout(&self) {
        let result = self
            .http
            .post(format!("{}/api/logout", self.base_url))
            .send()
            .await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!("auth: logout endpoint answered {}", response.status());
            }
            Err(err) => warn!("auth: logout request failed: {err}"),
            Ok(_) => {}
        }
        if let Err(err) = self.tokens.clear_token(AUTH_TOKEN_KEY).await {
            warn!("auth: failed to drop persisted token: {err}");
        }
        self.session.clear().await;
    }

    /// Background reconciliation with the current-user endpoint. Any
    /// failure, including transport errors, degrades to a guest session;
    /// nothing is surfaced to the user.
    pub async fn refresh_from_server(&self) -> Session {
        match self.fetch_current_user().await {
            Ok(Some(user)) => self.session.set_authenticated(user).await,
            Ok(None) => self.session.clear().await,
            Err(err) => {
                info!("auth: current-user refresh degraded to guest: {err}");
                self.session.clear().await;
            }
        }
        self.session.snapshot().await
    }

    /// Asks the server to send a reset link. The response body's `success`
    /// flag is authoritative; the confirmation message is deliberately
    /// neutral about whether the address is registered.
    pub async fn request_password_reset(&self, email: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(format!("{}/api/forgot-password", self.base_url))
            .json(&PasswordResetRequest {
                email: email.to_string(),
            })
            .send()
            .await?;
        let body: PasswordResetResponse = response.json().await?;
        if body.success {
            Ok(RESET_CONFIRMATION_MESSAGE.to_string())
        } else {
            let message = body
                .error
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            Err(AuthError::PasswordReset(message))
        }
    }

    async fn fetch_current_user(&self) -> Result<Option<UserProfile>, AuthError> {
        let response = self
            .http
            .get(format!("{}/api/auth/user", self.base_url))
            .send()
            .await?;
        let body: CurrentUserResponse = response.json().await?;
        if body.is_authenticated {
            Ok(body.user)
        } else {
            Ok(None)
        }
    }
}

async fn rejection_message(response: reqwest::Response, fallback: &str) -> String {
    response
        .json::<ErrorBody>()
        .await
        .unwrap_or_default()
        .message_or(fallback)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
