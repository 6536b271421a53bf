//! Notes list reconciliation.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::search::SearchState;
use crate::api::types::UpdateNote;
use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{DeleteScope, Note, NoteId};
use crate::realtime::NoteUpdate;
use crate::state::SyncState;

/// Notes split the way the list shows them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesView {
    pub pinned: Vec<Note>,
    pub others: Vec<Note>,
}

impl NotesView {
    #[must_use]
    pub fn len(&self) -> usize {
        self.pinned.len() + self.others.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty() && self.others.is_empty()
    }

    /// Pinned first, then the rest
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.pinned.iter().chain(self.others.iter())
    }
}

/// Ordered list of the current user's notes, owned and shared
#[derive(Debug, Clone, Default)]
pub struct NotesList {
    notes: Vec<Note>,
}

impl NotesList {
    #[must_use]
    pub const fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    fn get_mut(&mut self, id: &NoteId) -> Result<&mut Note> {
        self.notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    /// Replace the list with a fresh server load. Pin flags survive for notes
    /// that are still present.
    pub fn replace_all(&mut self, fresh: Vec<Note>) {
        let pinned = self.pinned_ids();
        self.notes = fresh;
        for note in &mut self.notes {
            note.is_pinned = pinned.contains(&note.id);
        }
    }

    pub fn prepend(&mut self, note: Note) {
        self.notes.retain(|existing| existing.id != note.id);
        self.notes.insert(0, note);
    }

    /// Flip the local pin flag and return the new value.
    pub fn toggle_pin(&mut self, id: &NoteId) -> Result<bool> {
        let note = self.get_mut(id)?;
        note.is_pinned = !note.is_pinned;
        Ok(note.is_pinned)
    }

    /// Pin exactly the given ids; unknown ids are ignored.
    pub fn set_pinned<'a>(&mut self, ids: impl IntoIterator<Item = &'a NoteId>) {
        let ids = ids.into_iter().collect::<HashSet<_>>();
        for note in &mut self.notes {
            note.is_pinned = ids.contains(&note.id);
        }
    }

    #[must_use]
    pub fn pinned_ids(&self) -> HashSet<NoteId> {
        self.notes
            .iter()
            .filter(|note| note.is_pinned)
            .map(|note| note.id.clone())
            .collect()
    }

    /// Move the note at `from` to `to`. Out-of-range indices are ignored.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.notes.len() || to >= self.notes.len() || from == to {
            return false;
        }
        let note = self.notes.remove(from);
        self.notes.insert(to, note);
        true
    }

    pub fn remove(&mut self, id: &NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| &note.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Patch a note in place from a pushed update. Returns false when the note
    /// is not in the list.
    pub fn apply_remote_update(&mut self, update: &NoteUpdate) -> bool {
        let Ok(note) = self.get_mut(&update.id) else {
            return false;
        };
        if let Some(title) = &update.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &update.content {
            note.content.clone_from(content);
        }
        if let Some(updated_at) = update.updated_at {
            note.updated_at = updated_at;
        }
        true
    }

    /// Filtered and sorted, split into pinned and others.
    #[must_use]
    pub fn view(&self, search: &SearchState) -> NotesView {
        let (pinned, others) = search
            .apply(&self.notes)
            .into_iter()
            .cloned()
            .partition(|note| note.is_pinned);
        NotesView { pinned, others }
    }
}

#[derive(Clone)]
pub struct NotesStore {
    api: ApiClient,
    list: Arc<Mutex<NotesList>>,
}

impl NotesStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            list: Arc::new(Mutex::new(NotesList::default())),
        }
    }

    /// Fetch owned and shared notes and merge them, owned first.
    pub async fn load(&self) -> Result<usize> {
        let dashboard = self.api.all_notes().await?;
        let current_user_id = self.api.session().current_user_id();

        let owned = dashboard
            .owned
            .into_iter()
            .map(|payload| payload.into_owned_note())
            .collect::<Vec<_>>();
        let owned_ids = owned
            .iter()
            .map(|note| note.id.clone())
            .collect::<HashSet<_>>();
        let shared = dashboard
            .other
            .into_iter()
            .filter(|payload| !owned_ids.contains(&payload.note_id))
            .map(|payload| payload.into_shared_note(current_user_id.as_deref()));

        let notes = owned.into_iter().chain(shared).collect::<Vec<_>>();
        let count = notes.len();
        self.list.lock().await.replace_all(notes);
        tracing::debug!("Loaded {} notes", count);
        Ok(count)
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<Note> {
        let payload = self.api.create_note(title, content).await?;
        let note = payload.into_owned_note();
        self.list.lock().await.prepend(note.clone());
        tracing::info!("Created note {}", note.id);
        Ok(note)
    }

    pub async fn toggle_pin(&self, id: &NoteId) -> Result<bool> {
        self.list.lock().await.toggle_pin(id)
    }

    pub async fn set_pinned(&self, ids: &[NoteId]) {
        self.list.lock().await.set_pinned(ids);
    }

    pub async fn pinned_ids(&self) -> HashSet<NoteId> {
        self.list.lock().await.pinned_ids()
    }

    pub async fn reorder(&self, from: usize, to: usize) -> bool {
        self.list.lock().await.reorder(from, to)
    }

    /// Push local edits. Only changed fields are sent while the note is in
    /// sync; after a failed save both fields go out so the backend catches up.
    /// On failure the edit stays local and pending.
    pub async fn save(&self, id: &NoteId, title: &str, content: &str) -> Result<Note> {
        let update = {
            let mut list = self.list.lock().await;
            let note = list.get_mut(id)?;
            if !note.can_edit() {
                return Err(Error::Forbidden(
                    "You have read-only access to this note".to_string(),
                ));
            }
            let update = if note.sync == SyncState::Synced {
                UpdateNote::diff(note, title, content)
            } else {
                UpdateNote::full(title, content)
            };
            if update.is_empty() {
                return Ok(note.clone());
            }
            note.title = title.to_string();
            note.content = content.to_string();
            note.sync = SyncState::Saving;
            update
        };

        match self.api.update_note(id, &update).await {
            Ok(saved) => {
                let mut list = self.list.lock().await;
                let note = list.get_mut(id)?;
                note.updated_at = saved.updated_at_or(note.updated_at);
                // A newer edit may have landed while the request was in flight.
                if note.title == title && note.content == content {
                    note.sync = SyncState::Synced;
                }
                Ok(note.clone())
            }
            Err(error) => {
                tracing::warn!("Failed to save note {}: {}", id, error);
                if let Ok(note) = self.list.lock().await.get_mut(id) {
                    note.sync = SyncState::Pending;
                }
                Err(error)
            }
        }
    }

    /// Delete for the current user or, owner only, for everyone. The note
    /// leaves the list only after the backend accepts.
    pub async fn delete(&self, id: &NoteId, scope: DeleteScope) -> Result<()> {
        {
            let list = self.list.lock().await;
            let note = list
                .get(id)
                .ok_or_else(|| Error::NotFound(format!("note {id}")))?;
            if scope == DeleteScope::ForEveryone && !note.is_owned {
                return Err(Error::Forbidden(
                    "Only the owner can delete a note for everyone".to_string(),
                ));
            }
        }

        self.api.delete_note(id, scope).await?;
        self.list.lock().await.remove(id);
        tracing::info!("Deleted note {} (scope={})", id, scope.as_query());
        Ok(())
    }

    pub async fn apply_remote_update(&self, update: &NoteUpdate) -> bool {
        let patched = self.list.lock().await.apply_remote_update(update);
        if patched {
            tracing::debug!("Applied remote update to note {}", update.id);
        }
        patched
    }

    pub async fn get(&self, id: &NoteId) -> Option<Note> {
        self.list.lock().await.get(id).cloned()
    }

    pub async fn snapshot(&self) -> Vec<Note> {
        self.list.lock().await.notes().to_vec()
    }

    pub async fn view(&self, search: &SearchState) -> NotesView {
        self.list.lock().await.view(search)
    }

    pub async fn replace_all(&self, notes: Vec<Note>) {
        self.list.lock().await.replace_all(notes);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::Session;
    use crate::config::ClientConfig;
    use crate::models::{fixtures, Permission};

    fn list() -> NotesList {
        NotesList::from_notes(vec![fixtures::note("1", "A"), fixtures::note("2", "B")])
    }

    fn offline_store() -> NotesStore {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        NotesStore::new(ApiClient::new(config, Session::in_memory()).unwrap())
    }

    #[test]
    fn toggle_pin_only_touches_the_target() {
        let mut notes = list();
        assert!(notes.toggle_pin(&NoteId::from("2")).unwrap());

        let by_id = |id: &str| notes.get(&NoteId::from(id)).unwrap().clone();
        assert!(by_id("2").is_pinned);
        assert_eq!(by_id("1"), fixtures::note("1", "A"));
    }

    #[test]
    fn toggle_pin_twice_restores_flag() {
        let mut notes = list();
        let id = NoteId::from("1");
        notes.toggle_pin(&id).unwrap();
        notes.toggle_pin(&id).unwrap();
        assert!(!notes.get(&id).unwrap().is_pinned);
    }

    #[test]
    fn toggle_pin_unknown_id_is_not_found() {
        let mut notes = list();
        assert!(matches!(
            notes.toggle_pin(&NoteId::from("404")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn reload_keeps_pins_of_surviving_notes() {
        let mut notes = list();
        notes.toggle_pin(&NoteId::from("1")).unwrap();
        notes.toggle_pin(&NoteId::from("2")).unwrap();

        notes.replace_all(vec![fixtures::note("2", "B2"), fixtures::note("3", "C")]);
        let pinned = notes.pinned_ids();
        assert_eq!(pinned.len(), 1);
        assert!(pinned.contains(&NoteId::from("2")));
    }

    #[test]
    fn reorder_moves_and_ignores_out_of_range() {
        let mut notes = NotesList::from_notes(vec![
            fixtures::note("1", "A"),
            fixtures::note("2", "B"),
            fixtures::note("3", "C"),
        ]);
        assert!(notes.reorder(2, 0));
        let order = notes
            .notes()
            .iter()
            .map(|note| note.id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["3", "1", "2"]);
        assert!(!notes.reorder(0, 3));
        assert!(!notes.reorder(1, 1));
    }

    #[test]
    fn remote_update_patches_in_place() {
        let mut notes = list();
        let at = Utc::now();
        let update = NoteUpdate {
            id: NoteId::from("2"),
            title: Some("B!".to_string()),
            content: None,
            updated_at: Some(at),
        };
        assert!(notes.apply_remote_update(&update));
        let note = notes.get(&NoteId::from("2")).unwrap();
        assert_eq!(note.title, "B!");
        assert_eq!(note.content, "");
        assert_eq!(note.updated_at, at);

        let unknown = NoteUpdate {
            id: NoteId::from("9"),
            ..update
        };
        assert!(!notes.apply_remote_update(&unknown));
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn view_splits_pinned_from_others() {
        let mut notes = list();
        let mut newer = fixtures::note("3", "C");
        newer.updated_at = newer.updated_at + Duration::hours(1);
        notes.prepend(newer);
        notes.toggle_pin(&NoteId::from("2")).unwrap();

        let view = notes.view(&SearchState::default());
        assert_eq!(view.pinned.len(), 1);
        assert_eq!(view.pinned[0].id.as_str(), "2");
        let others = view
            .others
            .iter()
            .map(|note| note.id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(others, vec!["3", "1"]);
        assert_eq!(view.len(), 3);
    }

    #[tokio::test]
    async fn save_rejects_read_only_notes() {
        let store = offline_store();
        let mut shared = fixtures::note("1", "A");
        shared.is_owned = false;
        shared.permission = Permission::ReadOnly;
        store.replace_all(vec![shared]).await;

        let error = store
            .save(&NoteId::from("1"), "A", "changed")
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Forbidden(_)));
        assert_eq!(store.get(&NoteId::from("1")).await.unwrap().content, "");
    }

    #[tokio::test]
    async fn save_without_changes_sends_nothing() {
        let store = offline_store();
        store.replace_all(vec![fixtures::note("1", "A")]).await;
        let note = store.save(&NoteId::from("1"), "A", "").await.unwrap();
        assert_eq!(note.sync, SyncState::Synced);
    }

    #[tokio::test]
    async fn failed_save_keeps_edit_pending() {
        let store = offline_store();
        store.replace_all(vec![fixtures::note("1", "A")]).await;

        assert!(store
            .save(&NoteId::from("1"), "A", "draft")
            .await
            .is_err());
        let note = store.get(&NoteId::from("1")).await.unwrap();
        assert_eq!(note.content, "draft");
        assert_eq!(note.sync, SyncState::Pending);
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_for_everyone() {
        let store = offline_store();
        let mut shared = fixtures::note("1", "A");
        shared.is_owned = false;
        store.replace_all(vec![shared]).await;

        let error = store
            .delete(&NoteId::from("1"), DeleteScope::ForEveryone)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Forbidden(_)));
        assert!(store.get(&NoteId::from("1")).await.is_some());
    }

    #[tokio::test]
    async fn failed_delete_keeps_note() {
        let store = offline_store();
        store.replace_all(vec![fixtures::note("1", "A")]).await;
        assert!(store
            .delete(&NoteId::from("1"), DeleteScope::ForMe)
            .await
            .is_err());
        assert!(store.get(&NoteId::from("1")).await.is_some());
    }
}
