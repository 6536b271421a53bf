//! Typed REST client for the Secure Notes backend.
//!
//! Every request carries the session's bearer token when one is present. A
//! 401 on an authenticated call clears the session (memory and persistence)
//! and surfaces as [`Error::Unauthorized`] so callers can send the user back
//! to login.

mod auth;
mod notes;
mod share;
pub mod types;
mod users;

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::Session;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::util::parse_api_error;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
    session: Session,
}

/// How a 401 is interpreted
#[derive(Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    /// Token rejected: force logout
    Session,
    /// Credentials rejected on login/signup: plain API error
    Credentials,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
            session,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.config.endpoint(path))
            .header(reqwest::header::ACCEPT, "application/json");
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, request: RequestBuilder, mode: AuthMode) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && mode == AuthMode::Session {
            tracing::warn!("Backend rejected session token; signing out");
            if let Err(error) = self.session.invalidate() {
                tracing::warn!("Failed to clear persisted session: {}", error);
            }
            return Err(Error::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(status, &body);
        if status == StatusCode::FORBIDDEN {
            return Err(Error::Forbidden(message));
        }
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request, AuthMode::Session).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.execute(request, AuthMode::Session).await?;
        Ok(())
    }

    async fn send_credentials<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request, AuthMode::Credentials).await?;
        Ok(response.json::<T>().await?)
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
