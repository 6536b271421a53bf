//! Trash listing, restore and permanent delete.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{DeleteScope, NoteId, TrashNote};

#[derive(Clone)]
pub struct TrashStore {
    api: ApiClient,
    notes: Arc<Mutex<Vec<TrashNote>>>,
}

impl TrashStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            notes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Most recently deleted first.
    pub async fn fetch(&self) -> Result<Vec<TrashNote>> {
        let mut fetched = self.api.trash().await?;
        fetched.sort_by(|left, right| right.deleted_at.cmp(&left.deleted_at));
        *self.notes.lock().await = fetched.clone();
        Ok(fetched)
    }

    pub async fn restore(&self, id: &NoteId) -> Result<()> {
        self.ensure_present(id).await?;
        self.api.restore_note(id).await?;
        self.notes.lock().await.retain(|note| &note.id != id);
        tracing::info!("Restored note {}", id);
        Ok(())
    }

    /// Remove permanently, for every collaborator.
    pub async fn delete_forever(&self, id: &NoteId) -> Result<()> {
        self.ensure_present(id).await?;
        self.api.delete_note(id, DeleteScope::ForEveryone).await?;
        self.notes.lock().await.retain(|note| &note.id != id);
        tracing::info!("Permanently deleted note {}", id);
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<TrashNote> {
        self.notes.lock().await.clone()
    }

    async fn ensure_present(&self, id: &NoteId) -> Result<()> {
        if self.notes.lock().await.iter().any(|note| &note.id == id) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("note {id} in trash")))
        }
    }
}
