//! Per-note collaborator panel.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{Collaborator, NoteId, Permission};
use crate::validation::validate_invite_email;

const INVITE_FAILED: &str = "Failed to invite user";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollaboratorPanel {
    pub is_open: bool,
    pub note_id: Option<NoteId>,
    pub collaborators: Vec<Collaborator>,
    pub is_current_user_owner: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl CollaboratorPanel {
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&Collaborator> {
        self.collaborators
            .iter()
            .find(|collaborator| collaborator.user_id == user_id)
    }

    fn shows(&self, note_id: &NoteId) -> bool {
        self.note_id.as_ref().is_none_or(|current| current == note_id)
    }
}

/// The backend's own message for request failures, else the fallback.
fn server_message(error: &Error, fallback: &str) -> String {
    match error {
        Error::Api { message, .. } | Error::Forbidden(message) if !message.is_empty() => {
            message.clone()
        }
        Error::Validation(errors) => errors.to_string(),
        _ => fallback.to_string(),
    }
}

#[derive(Clone)]
pub struct CollaboratorStore {
    api: ApiClient,
    panel: Arc<Mutex<CollaboratorPanel>>,
}

impl CollaboratorStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            panel: Arc::new(Mutex::new(CollaboratorPanel::default())),
        }
    }

    pub async fn open_panel(&self, note_id: NoteId) {
        {
            let mut panel = self.panel.lock().await;
            panel.is_open = true;
            panel.note_id = Some(note_id.clone());
            panel.collaborators.clear();
            panel.error = None;
        }
        self.fetch(&note_id).await;
    }

    pub async fn close_panel(&self) {
        *self.panel.lock().await = CollaboratorPanel::default();
    }

    pub async fn snapshot(&self) -> CollaboratorPanel {
        self.panel.lock().await.clone()
    }

    /// Load collaborators from the note. Failures are logged and leave the
    /// list as it was, without setting the panel error.
    pub async fn fetch(&self, note_id: &NoteId) {
        self.panel.lock().await.is_loading = true;

        let result = self.api.get_note(note_id).await;
        let current_user_id = self.api.session().current_user_id();

        let mut panel = self.panel.lock().await;
        panel.is_loading = false;
        match result {
            Ok(note) if panel.shows(note_id) => {
                panel.is_current_user_owner = match (&note.user_id, &current_user_id) {
                    (Some(owner), Some(current)) => owner == current,
                    _ => false,
                };
                panel.collaborators = note.collaborators();
            }
            Ok(_) => tracing::debug!("Dropping collaborators for closed note {}", note_id),
            Err(error) => {
                tracing::warn!("Failed to fetch collaborators for {}: {}", note_id, error);
            }
        }
    }

    /// Share the open note with `email`. The new collaborator shows as
    /// pending after the refetch.
    pub async fn invite(&self, email: &str, permission: Permission) -> Result<()> {
        let Some(note_id) = self.begin().await else {
            return Ok(());
        };

        let result = match validate_invite_email(email) {
            Ok(()) => self
                .api
                .create_share_request(&note_id, email, permission)
                .await,
            Err(errors) => Err(Error::Validation(errors)),
        };

        match result {
            Ok(()) => {
                tracing::info!("Invited {} to note {}", email.trim(), note_id);
                self.fetch(&note_id).await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to invite {} to {}: {}", email.trim(), note_id, error);
                self.fail(server_message(&error, INVITE_FAILED)).await;
                Err(error)
            }
        }
    }

    /// Applied locally first; a rejected change re-syncs from the server.
    pub async fn update_permission(&self, user_id: &str, permission: Permission) -> Result<()> {
        let note_id = {
            let mut panel = self.panel.lock().await;
            let Some(note_id) = panel.note_id.clone() else {
                return Ok(());
            };
            let collaborator = panel
                .collaborators
                .iter_mut()
                .find(|collaborator| collaborator.user_id == user_id)
                .ok_or_else(|| Error::NotFound(format!("collaborator {user_id}")))?;
            collaborator.permission = permission;
            panel.error = None;
            note_id
        };

        match self
            .api
            .update_share_permission(&note_id, user_id, permission)
            .await
        {
            Ok(()) => Ok(()),
            Err(error) => {
                tracing::warn!("Failed to update permission for {}: {}", user_id, error);
                self.fail(server_message(&error, "Failed to update permission"))
                    .await;
                self.fetch(&note_id).await;
                Err(error)
            }
        }
    }

    /// Revoke access. Removed locally only on success; a failure re-syncs.
    pub async fn remove(&self, user_id: &str) -> Result<()> {
        let Some(note_id) = self.begin().await else {
            return Ok(());
        };

        match self.api.revoke_access(&note_id, user_id).await {
            Ok(()) => {
                let mut panel = self.panel.lock().await;
                panel
                    .collaborators
                    .retain(|collaborator| collaborator.user_id != user_id);
                panel.is_loading = false;
                tracing::info!("Revoked {} from note {}", user_id, note_id);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to remove collaborator {}: {}", user_id, error);
                self.fail(server_message(&error, "Failed to remove collaborator"))
                    .await;
                self.fetch(&note_id).await;
                Err(error)
            }
        }
    }

    async fn begin(&self) -> Option<NoteId> {
        let mut panel = self.panel.lock().await;
        let note_id = panel.note_id.clone()?;
        panel.is_loading = true;
        panel.error = None;
        Some(note_id)
    }

    async fn fail(&self, message: String) {
        let mut panel = self.panel.lock().await;
        panel.error = Some(message);
        panel.is_loading = false;
    }
}
