use std::sync::Arc;

use shared::domain::UserProfile;

use crate::{AuthClient, Session, SessionStore};

/// What the navigation bar should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavView {
    /// Sign-in and create-account affordances.
    Guest,
    /// Account menu: first-name greeting plus a logout control.
    Account { first_name: String },
}

/// View-model behind the site navigation bar. Holds the server-rendered
/// user hint, triggers at most one background session refresh when no hint
/// was supplied, and collapses back to the guest view on logout.
pub struct NavMenu {
    store: Arc<SessionStore>,
    server_user: Option<UserProfile>,
    refreshed: bool,
}

impl NavMenu {
    pub fn new(store: Arc<SessionStore>, initial_user: Option<UserProfile>) -> Self {
        Self {
            store,
            server_user: initial_user,
            refreshed: false,
        }
    }

    /// Reconciles the session with the server, once, and only when no
    /// server-provided hint was available at construction.
    pub async fn ensure_fresh(&mut self, client: &AuthClient) {
        if self.server_user.is_some() || self.refreshed {
            return;
        }
        self.refreshed = true;
        client.refresh_from_server().await;
    }

    /// The hint wins the greeting when both it and the store are present.
    pub async fn view(&self) -> NavView {
        if let Some(user) = &self.server_user {
            return NavView::Account {
                first_name: user.first_name.clone(),
            };
        }
        match self.store.snapshot().await {
            Session::Authenticated(user) => NavView::Account {
                first_name: user.first_name,
            },
            Session::Guest => NavView::Guest,
        }
    }

    /// Runs the logout action and drops the locally mirrored hint so the
    /// menu collapses even if the endpoint call failed.
    pub async fn log_out(&mut self, client: &AuthClient) {
        client.logout().await;
        self.server_user = None;
    }
}
