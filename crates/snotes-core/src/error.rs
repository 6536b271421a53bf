//! Error types for snotes-core

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type alias using snotes-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in snotes-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the bearer token; the session has been cleared
    #[error("Session expired or invalid. Please log in again.")]
    Unauthorized,

    /// No session token is available for an authenticated call
    #[error("Not logged in")]
    NotAuthenticated,

    /// The current user lacks the rights for this action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Non-success response from the backend
    #[error("API error: {message} ({status})")]
    Api { status: u16, message: String },

    /// Entity missing from the local view
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client-side form validation failed
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Realtime socket failure
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Session persistence failure
    #[error("Secure storage error: {0}")]
    SessionStorage(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Message suitable for inline display, preferring the backend's text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Realtime(value.to_string())
    }
}
