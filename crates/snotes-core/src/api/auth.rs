use reqwest::Method;

use super::types::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Register an account. Does not sign in.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<SignupResponse> {
        let body = SignupRequest {
            name,
            email,
            password,
        };
        let request = self.request(Method::POST, "/auth/signup").json(&body);
        self.send_credentials(request).await
    }

    /// Exchange credentials for an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let body = LoginRequest { email, password };
        let request = self.request(Method::POST, "/auth/login").json(&body);
        let response: LoginResponse = self.send_credentials(request).await?;
        Ok(response.access_token)
    }
}
