//! Client configuration.
//!
//! Provides a unified `ClientConfig` used by every client to discover the
//! REST base URL and the realtime socket endpoint.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/securenotes";
/// Idle time before a note being edited is saved.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);
/// How long soft-deleted notes stay in the trash.
pub const TRASH_RETENTION_DAYS: i64 = 7;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const API_BASE_URL_ENV: &str = "SNOTES_API_BASE_URL";
pub const SOCKET_URL_ENV: &str = "SNOTES_SOCKET_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST base URL, without trailing slash
    pub api_base_url: String,
    /// Socket server origin; derived from `api_base_url` when absent
    #[serde(default)]
    pub socket_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
    #[serde(default = "default_autosave_debounce")]
    pub autosave_debounce: Duration,
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
}

const fn default_autosave_debounce() -> Duration {
    AUTOSAVE_DEBOUNCE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            socket_url: None,
            request_timeout: default_request_timeout(),
            autosave_debounce: AUTOSAVE_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_http_url(api_base_url.into(), "API base URL")?,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_socket_url(mut self, socket_url: Option<String>) -> Self {
        self.socket_url = normalize_text_option(socket_url)
            .map(|url| url.trim_end_matches('/').to_string());
        self
    }

    #[must_use]
    pub const fn with_autosave_debounce(mut self, debounce: Duration) -> Self {
        self.autosave_debounce = debounce;
        self
    }

    /// Resolve from `SNOTES_API_BASE_URL` / `SNOTES_SOCKET_URL`, falling back
    /// to the given base URL and then the built-in default.
    pub fn from_env(fallback_base_url: Option<String>) -> Result<Self> {
        let base = normalize_text_option(env::var(API_BASE_URL_ENV).ok())
            .or_else(|| normalize_text_option(fallback_base_url))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let socket = normalize_text_option(env::var(SOCKET_URL_ENV).ok());
        Ok(Self::new(base)?.with_socket_url(socket))
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Origin the realtime socket connects to.
    pub fn socket_base_url(&self) -> Result<String> {
        if let Some(url) = normalize_text_option(self.socket_url.clone()) {
            return normalize_http_url(url, "socket URL");
        }

        let parsed = Url::parse(&self.api_base_url)
            .map_err(|error| Error::Config(format!("invalid API base URL: {error}")))?;
        let origin = parsed.origin().ascii_serialization();
        if origin == "null" {
            return Err(Error::Config(
                "API base URL has no origin to derive a socket URL from".to_string(),
            ));
        }
        Ok(origin)
    }
}

fn normalize_http_url(raw: String, field: &str) -> Result<String> {
    let value = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config(format!("{field} must not be empty")))?;
    if is_http_url(&value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(format!(
            "{field} must include http:// or https://"
        )))
    }
}
