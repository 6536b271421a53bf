//! Where the session token lives between runs.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::UserProfile;

/// The persisted part of the auth state
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StoredSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

pub trait SessionPersistence: Send + Sync + 'static {
    fn load_session(&self) -> Result<Option<StoredSession>>;
    fn save_session(&self, session: &StoredSession) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

/// Process-local store; sessions vanish on exit.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> Result<Option<StoredSession>> {
        let guard = self
            .slot
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_session(&self, session: &StoredSession) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}
