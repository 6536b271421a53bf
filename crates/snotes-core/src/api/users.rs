use reqwest::Method;

use super::types::UpdateProfile;
use super::ApiClient;
use crate::error::Result;
use crate::models::UserProfile;

impl ApiClient {
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.send_json(self.request(Method::GET, "/users/me")).await
    }

    pub async fn update_current_user(&self, name: &str) -> Result<UserProfile> {
        let body = UpdateProfile {
            name: name.trim().to_string(),
        };
        let request = self.request(Method::PATCH, "/users/me").json(&body);
        self.send_json(request).await
    }
}
