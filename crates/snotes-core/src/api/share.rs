use reqwest::Method;

use super::types::{CreateShareRequest, RespondShare, UpdatePermission};
use super::{segment, ApiClient};
use crate::error::Result;
use crate::models::{NoteId, Permission, ShareAction, ShareRequest};

impl ApiClient {
    /// Ask for (or grant) access to a note for the user behind `receiver_email`.
    pub async fn create_share_request(
        &self,
        note_id: &NoteId,
        receiver_email: &str,
        permission: Permission,
    ) -> Result<()> {
        let body = CreateShareRequest {
            note_id: note_id.clone(),
            receiver_email: receiver_email.trim().to_string(),
            permission,
        };
        let request = self.request(Method::POST, "/share").json(&body);
        self.send_empty(request).await
    }

    /// Requests addressed to notes the current user owns.
    pub async fn share_requests(&self) -> Result<Vec<ShareRequest>> {
        self.send_json(self.request(Method::GET, "/share/requests"))
            .await
    }

    pub async fn respond_share_request(&self, request_id: &str, action: ShareAction) -> Result<()> {
        let body = RespondShare {
            request_id: request_id.to_string(),
            action,
        };
        let request = self.request(Method::POST, "/share/respond").json(&body);
        self.send_empty(request).await
    }

    pub async fn update_share_permission(
        &self,
        note_id: &NoteId,
        user_id: &str,
        permission: Permission,
    ) -> Result<()> {
        let body = UpdatePermission {
            note_id: note_id.clone(),
            user_id: user_id.to_string(),
            permission,
        };
        let request = self.request(Method::PATCH, "/share/permission").json(&body);
        self.send_empty(request).await
    }

    pub async fn revoke_access(&self, note_id: &NoteId, user_id: &str) -> Result<()> {
        let path = format!(
            "/share/revoke/{}/{}",
            segment(note_id.as_str()),
            segment(user_id)
        );
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
