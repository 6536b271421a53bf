//! Shared session handle read by the API client and watched by the socket.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::persistence::{MemorySessionStore, SessionPersistence, StoredSession};
use crate::error::Result;
use crate::models::UserProfile;

/// Observable authentication state
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    /// Set once persisted state has been loaded
    pub is_hydrated: bool,
}

impl AuthState {
    fn signed_in(token: String, user: Option<UserProfile>) -> Self {
        Self {
            token: Some(token),
            user,
            is_authenticated: true,
            is_hydrated: true,
        }
    }

    fn signed_out() -> Self {
        Self {
            token: None,
            user: None,
            is_authenticated: false,
            is_hydrated: true,
        }
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthState")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("is_authenticated", &self.is_authenticated)
            .field("is_hydrated", &self.is_hydrated)
            .finish()
    }
}

#[derive(Clone)]
pub struct Session {
    state: Arc<watch::Sender<AuthState>>,
    persistence: Arc<dyn SessionPersistence>,
}

impl Session {
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            state: Arc::new(state),
            persistence,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    /// Load the persisted session into memory.
    pub fn hydrate(&self) -> Result<AuthState> {
        let next = match self.persistence.load_session()? {
            Some(stored) if !stored.token.trim().is_empty() => {
                AuthState::signed_in(stored.token, stored.user)
            }
            _ => AuthState::signed_out(),
        };
        self.state.send_replace(next.clone());
        Ok(next)
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    #[must_use]
    pub fn current_user_id(&self) -> Option<String> {
        self.state
            .borrow()
            .user
            .as_ref()
            .map(|user| user.user_id.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn establish(&self, token: String, user: Option<UserProfile>) -> Result<()> {
        self.persistence.save_session(&StoredSession {
            token: token.clone(),
            user: user.clone(),
        })?;
        self.state.send_replace(AuthState::signed_in(token, user));
        Ok(())
    }

    /// Attach the profile to the current session, if still signed in.
    pub fn set_user(&self, user: UserProfile) -> Result<()> {
        let Some(token) = self.token() else {
            return Ok(());
        };
        self.establish(token, Some(user))
    }

    /// Drop the session everywhere. In-memory state is cleared even when the
    /// persistent store fails.
    pub fn invalidate(&self) -> Result<()> {
        self.state.send_replace(AuthState::signed_out());
        self.persistence.clear_session()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
