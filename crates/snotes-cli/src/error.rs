use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] snotes_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Edited note content cannot be empty")]
    EmptyEditedContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Share request not found: {0}")]
    RequestNotFound(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Profile '{0}' is not signed in")]
    NotSignedIn(String),
    #[error("{0}")]
    Collaborators(String),
}

impl CliError {
    /// Follow-up shown under the error when the session is missing or expired.
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotSignedIn(_)
            | Self::Core(snotes_core::Error::Unauthorized | snotes_core::Error::NotAuthenticated) => {
                Some("Run `snotes auth login --email <email> --password <password>` to sign in.")
            }
            _ => None,
        }
    }
}
