use shared::domain::UserProfile;
use tokio::sync::{broadcast, RwLock};

const SESSION_EVENT_CAPACITY: usize = 16;

/// Authentication state for the running client. `Authenticated` always
/// carries the profile, so an authenticated session without a user is
/// unrepresentable.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Guest,
    Authenticated(UserProfile),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Session::Guest => None,
            Session::Authenticated(user) => Some(user),
        }
    }
}

/// Single source of truth for "who is signed in", shared as an `Arc` across
/// the navigation menu and any form that reacts to auth changes. Mutated
/// only by the auth actions; interleaved completions resolve last-write-wins.
pub struct SessionStore {
    inner: RwLock<Session>,
    events: broadcast::Sender<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_initial(Session::Guest)
    }

    /// Seeds the store from a server-provided session hint.
    pub fn with_initial(initial: Session) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            inner: RwLock::new(initial),
            events,
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn set_authenticated(&self, user: UserProfile) {
        self.apply(Session::Authenticated(user)).await;
    }

    pub async fn clear(&self) {
        self.apply(Session::Guest).await;
    }

    /// Subscribers receive the new session on every actual change; writes
    /// that leave the value untouched are not rebroadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<Session> {
        self.events.subscribe()
    }

    async fn apply(&self, next: Session) {
        let mut guard = self.inner.write().await;
        if *guard == next {
            return;
        }
        *guard = next.clone();
        let _ = self.events.send(next);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
