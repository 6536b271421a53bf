use reqwest::Method;

use super::types::{CreateNote, DashboardResponse, NotePayload, SavedNote, TrashEntry, UpdateNote};
use super::{segment, ApiClient, AuthMode};
use crate::error::Result;
use crate::models::{DeleteScope, NoteId, TrashNote};

impl ApiClient {
    pub async fn create_note(&self, title: &str, content: &str) -> Result<NotePayload> {
        let body = CreateNote {
            title: title.to_string(),
            content: content.to_string(),
        };
        let request = self.request(Method::POST, "/notes").json(&body);
        self.send_json(request).await
    }

    pub async fn get_note(&self, id: &NoteId) -> Result<NotePayload> {
        let path = format!("/notes/{}", segment(id.as_str()));
        self.send_json(self.request(Method::GET, &path)).await
    }

    /// Apply a partial update. Some backend versions answer with an empty body.
    pub async fn update_note(&self, id: &NoteId, update: &UpdateNote) -> Result<SavedNote> {
        let path = format!("/notes/{}", segment(id.as_str()));
        let request = self.request(Method::PATCH, &path).json(update);
        let response = self.execute(request, AuthMode::Session).await?;
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(SavedNote::default());
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn delete_note(&self, id: &NoteId, scope: DeleteScope) -> Result<()> {
        let path = format!("/notes/{}", segment(id.as_str()));
        let request = self
            .request(Method::DELETE, &path)
            .query(&[("scope", scope.as_query())]);
        self.send_empty(request).await
    }

    /// Raw file contents as served by the backend.
    pub async fn download_note(&self, id: &NoteId) -> Result<Vec<u8>> {
        let path = format!("/notes/{}/download", segment(id.as_str()));
        let request = self.request(Method::GET, &path);
        let response = self.execute(request, AuthMode::Session).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Owned and shared-with-me notes in one call.
    pub async fn all_notes(&self) -> Result<DashboardResponse> {
        self.send_json(self.request(Method::GET, "/notes/all")).await
    }

    pub async fn trash(&self) -> Result<Vec<TrashNote>> {
        let entries: Vec<TrashEntry> = self
            .send_json(self.request(Method::GET, "/notes/trash"))
            .await?;
        Ok(entries.into_iter().map(TrashNote::from).collect())
    }

    pub async fn restore_note(&self, id: &NoteId) -> Result<()> {
        let path = format!("/notes/{}/restore", segment(id.as_str()));
        self.send_empty(self.request(Method::PATCH, &path)).await
    }
}
