//! Wire shapes exchanged with the backend and their conversion into models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{
    Collaborator, Note, NoteId, Permission, RequestStatus, ShareAction, TrashNote, UserSummary,
};
use crate::state::SyncState;
use crate::util::{email_local_part, parse_timestamp_or};

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupResponse {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
}

/// Partial update; absent fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdateNote {
    /// Both fields, for notes whose last save did not reach the backend
    #[must_use]
    pub fn full(title: &str, content: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    /// Only the fields that differ from the current values
    #[must_use]
    pub fn diff(current: &Note, title: &str, content: &str) -> Self {
        Self {
            title: (current.title != title).then(|| title.to_string()),
            content: (current.content != content).then(|| content.to_string()),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProfile {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    pub note_id: NoteId,
    pub receiver_email: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondShare {
    pub request_id: String,
    pub action: ShareAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermission {
    pub note_id: NoteId,
    pub user_id: String,
    pub permission: Permission,
}

/// A request attached to a note, as the owner sees it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollaboratorRequest {
    pub request_id: String,
    pub status: RequestStatus,
    pub permission: Permission,
    #[serde(default)]
    pub receiver: Option<UserSummary>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

/// Alternate collaborator list some backend versions send
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWithEntry {
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotePayload {
    pub note_id: NoteId,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub permission: Option<Permission>,
    #[serde(default)]
    pub requests: Option<Vec<CollaboratorRequest>>,
    #[serde(default, rename = "sharedWith")]
    pub shared_with: Option<Vec<SharedWithEntry>>,
}

/// Backend rows come straight from nullable columns.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response to `PATCH /notes/:id`. Reconciliation only needs the timestamp,
/// so every other field the backend echoes is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SavedNote {
    #[serde(default, rename = "updatedAt", alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl SavedNote {
    /// Server timestamp, or `fallback` when the response carries none.
    #[must_use]
    pub fn updated_at_or(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        parse_timestamp_or(self.updated_at.as_deref(), fallback)
    }
}

impl NotePayload {
    fn timestamps(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        let updated_at = parse_timestamp_or(self.updated_at.as_deref(), now);
        let created_at = parse_timestamp_or(self.created_at.as_deref(), updated_at);
        (created_at, updated_at)
    }

    /// A note the current user created
    #[must_use]
    pub fn into_owned_note(self) -> Note {
        let (created_at, updated_at) = self.timestamps();
        Note {
            id: self.note_id,
            title: self.title,
            content: self.content.unwrap_or_default(),
            is_pinned: false,
            is_owned: true,
            permission: Permission::Edit,
            owner_id: self.user_id,
            created_at,
            updated_at,
            sync: SyncState::Synced,
        }
    }

    /// A note shared with the current user. Permission comes from the latest
    /// accepted request addressed to them, then the note-level field.
    #[must_use]
    pub fn into_shared_note(self, current_user_id: Option<&str>) -> Note {
        let permission = current_user_id
            .and_then(|user_id| self.latest_accepted_permission(user_id))
            .or(self.permission)
            .unwrap_or_default();
        let (created_at, updated_at) = self.timestamps();
        Note {
            id: self.note_id,
            title: self.title,
            content: self.content.unwrap_or_default(),
            is_pinned: false,
            is_owned: false,
            permission,
            owner_id: self.user_id,
            created_at,
            updated_at,
            sync: SyncState::Synced,
        }
    }

    fn latest_accepted_permission(&self, user_id: &str) -> Option<Permission> {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        self.requests
            .as_deref()?
            .iter()
            .enumerate()
            .filter(|(_, request)| request.status == RequestStatus::Accepted)
            .filter(|(_, request)| {
                request
                    .receiver
                    .as_ref()
                    .is_some_and(|receiver| receiver.user_id == user_id)
            })
            .max_by_key(|(index, request)| {
                (parse_timestamp_or(request.created_at.as_deref(), epoch), *index)
            })
            .map(|(_, request)| request.permission)
    }

    /// Collaborators derived from `requests`, falling back to `sharedWith`
    #[must_use]
    pub fn collaborators(&self) -> Vec<Collaborator> {
        if let Some(requests) = self.requests.as_deref() {
            return requests
                .iter()
                .filter_map(|request| {
                    let receiver = request.receiver.as_ref()?;
                    Some(Collaborator {
                        user_id: receiver.user_id.clone(),
                        name: display_name(&receiver.name, &receiver.email),
                        email: receiver.email.clone(),
                        permission: request.permission,
                        status: Some(request.status),
                        is_owner: false,
                    })
                })
                .collect();
        }

        self.shared_with
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|entry| Collaborator {
                user_id: entry.user_id.clone(),
                name: display_name(&entry.name, &entry.email),
                email: entry.email.clone(),
                permission: entry.permission,
                status: entry.status,
                is_owner: false,
            })
            .collect()
    }
}

fn display_name(name: &str, email: &str) -> String {
    let name = name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    email_local_part(email).unwrap_or("User").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardResponse {
    #[serde(default)]
    pub owned: Vec<NotePayload>,
    #[serde(default)]
    pub other: Vec<NotePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrashNoteRef {
    pub note_id: NoteId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrashEntry {
    pub note: TrashNoteRef,
    #[serde(default, rename = "deletedAt")]
    pub deleted_at: Option<String>,
}

impl From<TrashEntry> for TrashNote {
    fn from(value: TrashEntry) -> Self {
        let now = Utc::now();
        let updated_at = parse_timestamp_or(value.note.updated_at.as_deref(), now);
        let deleted_at = parse_timestamp_or(value.deleted_at.as_deref(), updated_at);
        Self {
            id: value.note.note_id,
            title: value.note.title,
            updated_at,
            deleted_at,
        }
    }
}
