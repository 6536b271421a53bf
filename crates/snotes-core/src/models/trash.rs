//! Trashed note model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::NoteId;
use crate::config::TRASH_RETENTION_DAYS;

/// A soft-deleted note waiting out the retention window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashNote {
    pub id: NoteId,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

impl TrashNote {
    /// When the backend removes the note permanently
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.deleted_at + Duration::days(TRASH_RETENTION_DAYS)
    }

    /// Whole days left before permanent removal, never negative
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at() - now).num_days().max(0)
    }
}
