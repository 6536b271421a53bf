//! Keychain-backed session persistence, one entry per profile.
//!
//! The entry holds the JSON-encoded [`StoredSession`]. An entry that no longer
//! decodes (an older CLI, a hand edit) is dropped and the profile reads as
//! signed out.

use snotes_core::auth::{SessionPersistence, StoredSession};
use snotes_core::{Error, Result};

#[derive(Clone)]
pub struct KeychainSessionStore {
    account: String,
}

impl KeychainSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            account: format!("session:{profile_name}"),
        }
    }
}

impl SessionPersistence for KeychainSessionStore {
    fn load_session(&self) -> Result<Option<StoredSession>> {
        let Some(raw) = vault::read(&self.account)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!("Discarding unreadable session for {}: {}", self.account, error);
                vault::delete(&self.account)?;
                Ok(None)
            }
        }
    }

    fn save_session(&self, session: &StoredSession) -> Result<()> {
        vault::write(&self.account, &serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> Result<()> {
        vault::delete(&self.account)
    }
}

fn storage_error(error: impl std::fmt::Display) -> Error {
    Error::SessionStorage(error.to_string())
}

/// OS keychain under the `snotes-cli` service.
#[cfg(not(test))]
mod vault {
    use keyring::Entry;
    use snotes_core::Result;

    use super::storage_error;

    const SERVICE: &str = "snotes-cli";

    fn entry(account: &str) -> Result<Entry> {
        Entry::new(SERVICE, account).map_err(storage_error)
    }

    pub fn read(account: &str) -> Result<Option<String>> {
        match entry(account)?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    pub fn write(account: &str, raw: &str) -> Result<()> {
        entry(account)?.set_password(raw).map_err(storage_error)
    }

    pub fn delete(account: &str) -> Result<()> {
        match entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sessions_are_scoped_per_profile() {
        let work = KeychainSessionStore::new("keychain-test-work");
        let home = KeychainSessionStore::new("keychain-test-home");
        let session = StoredSession {
            token: "tok-work".to_string(),
            user: None,
        };

        work.save_session(&session).unwrap();
        assert_eq!(work.load_session().unwrap(), Some(session));
        assert_eq!(home.load_session().unwrap(), None);

        work.clear_session().unwrap();
        assert_eq!(work.load_session().unwrap(), None);
        home.clear_session().unwrap();
    }

    #[test]
    fn unreadable_entry_reads_as_signed_out() {
        let store = KeychainSessionStore::new("keychain-test-corrupt");
        vault::write("session:keychain-test-corrupt", "{not json").unwrap();

        assert_eq!(store.load_session().unwrap(), None);
        assert_eq!(vault::read("session:keychain-test-corrupt").unwrap(), None);
    }
}
