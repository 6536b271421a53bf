//! Share request model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NoteId, Permission};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Accepted, Self::Rejected];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::InvalidInput(format!("unknown request status '{other}'"))),
        }
    }
}

/// Owner's answer to a share request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareAction {
    Accept,
    Reject,
}

impl ShareAction {
    #[must_use]
    pub const fn resulting_status(self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    #[serde(rename = "note_id")]
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
}

/// An access request addressed to the owner of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    #[serde(rename = "request_id")]
    pub id: String,
    pub status: RequestStatus,
    pub permission: Permission,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub sender: UserSummary,
    pub note: NoteRef,
}

impl ShareRequest {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_request_deserializes_backend_payload() {
        let payload = r#"
        {
          "request_id": "req1",
          "status": "PENDING",
          "permission": "EDIT",
          "description": "Need to add Q4 financial updates.",
          "createdAt": "2024-05-01T10:00:00.000Z",
          "sender": { "user_id": "u1", "name": "Alice Walker", "email": "alice.w@example.com" },
          "note": { "note_id": "n1", "title": "Q4 Financial Report" }
        }
        "#;
        let request: ShareRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.id, "req1");
        assert!(request.is_pending());
        assert_eq!(request.permission, Permission::Edit);
        assert_eq!(request.note.id.as_str(), "n1");
        assert_eq!(request.sender.name, "Alice Walker");
    }

    #[test]
    fn share_action_maps_to_status() {
        assert_eq!(ShareAction::Accept.resulting_status(), RequestStatus::Accepted);
        assert_eq!(ShareAction::Reject.resulting_status(), RequestStatus::Rejected);
        assert_eq!(serde_json::to_string(&ShareAction::Accept).unwrap(), "\"ACCEPT\"");
    }
}
