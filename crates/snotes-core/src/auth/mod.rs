//! Authentication: session state, persistence, and the login/signup flows.

mod persistence;
mod session;

pub use persistence::{MemorySessionStore, SessionPersistence, StoredSession};
pub use session::{AuthState, Session};

use tokio::sync::watch;

use crate::api::types::SignupResponse;
use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::UserProfile;
use crate::validation::{validate_login, validate_signup, SignupForm};

/// Login, signup, logout and profile actions over the shared session
#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
}

impl AuthStore {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &Session {
        self.api.session()
    }

    /// Load the persisted session, if any.
    pub fn restore(&self) -> Result<AuthState> {
        let state = self.session().hydrate()?;
        tracing::debug!(authenticated = state.is_authenticated, "Session restored");
        Ok(state)
    }

    /// Sign in and persist the session. The profile is fetched afterwards;
    /// failing to fetch it does not undo the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthState> {
        validate_login(email, password)?;

        let token = self.api.login(email.trim(), password).await?;
        if token.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Login response did not include an access token".to_string(),
            ));
        }
        self.session().establish(token, None)?;
        tracing::info!("Signed in as {}", email.trim());

        match self.load_profile().await {
            Ok(_) => {}
            Err(Error::Unauthorized) => return Err(Error::Unauthorized),
            Err(error) => tracing::warn!("Failed to load profile after login: {}", error),
        }

        Ok(self.state())
    }

    /// Register an account. The caller signs in separately.
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResponse> {
        validate_signup(form)?;
        let response = self
            .api
            .signup(&form.full_name(), form.email.trim(), &form.password)
            .await?;
        tracing::info!("Registered account {}", response.email);
        Ok(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.session().invalidate()?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub async fn load_profile(&self) -> Result<UserProfile> {
        if !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        let user = self.api.current_user().await?;
        self.session().set_user(user.clone())?;
        Ok(user)
    }

    pub async fn update_profile(&self, name: &str) -> Result<UserProfile> {
        if !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Name cannot be empty".to_string()));
        }
        let user = self.api.update_current_user(name).await?;
        self.session().set_user(user.clone())?;
        Ok(user)
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.session().state()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.session().token()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session().subscribe()
    }
}
