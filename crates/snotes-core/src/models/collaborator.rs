use serde::{Deserialize, Serialize};

use super::{Permission, RequestStatus};

/// A user a note is shared with, as shown in the collaborator panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub permission: Permission,
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub is_owner: bool,
}

impl Collaborator {
    #[must_use]
    pub fn has_access(&self) -> bool {
        matches!(self.status, None | Some(RequestStatus::Accepted))
    }
}
