//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::state::SyncState;

/// Server-assigned note identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("note id must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Access level of a collaborator on a note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    #[default]
    ReadOnly,
    Edit,
}

impl Permission {
    #[must_use]
    pub const fn can_edit(self) -> bool {
        matches!(self, Self::Edit)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReadOnly => "Can view",
            Self::Edit => "Can edit",
        }
    }

    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::ReadOnly => "READ_ONLY",
            Self::Edit => "EDIT",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "read_only" | "readonly" | "read" | "view" => Ok(Self::ReadOnly),
            "edit" | "write" => Ok(Self::Edit),
            other => Err(Error::InvalidInput(format!(
                "unknown permission '{other}' (expected read-only or edit)"
            ))),
        }
    }
}

/// Who a delete applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Remove from the current user's view only
    ForMe,
    /// Owner-only: move the note to trash for every collaborator
    ForEveryone,
}

impl DeleteScope {
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::ForMe => "me",
            Self::ForEveryone => "all",
        }
    }
}

/// A note in the client-side list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Local-only pin flag
    pub is_pinned: bool,
    /// True for notes the current user created
    pub is_owned: bool,
    /// Owners always hold `Edit`
    pub permission: Permission,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sync: SyncState,
}

impl Note {
    /// Whether the current user may push edits for this note
    #[must_use]
    pub const fn can_edit(&self) -> bool {
        self.is_owned || self.permission.can_edit()
    }

    /// First non-empty line of the title, falling back to content, truncated
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let source = if self.title.trim().is_empty() {
            self.content.as_str()
        } else {
            self.title.as_str()
        };
        let first_line = source.lines().map(str::trim).find(|line| !line.is_empty());
        let collapsed = first_line
            .unwrap_or("")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if collapsed.chars().count() <= max_chars {
            collapsed
        } else {
            let take_len = max_chars.saturating_sub(3);
            let mut truncated = collapsed.chars().take(take_len).collect::<String>();
            truncated.push_str("...");
            truncated
        }
    }

    /// Case-insensitive match against title and content
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query) || self.content.to_lowercase().contains(&query)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_id_parse_rejects_empty() {
        assert!(" ".parse::<NoteId>().is_err());
        assert_eq!("  n1 ".parse::<NoteId>().unwrap().as_str(), "n1");
    }

    #[test]
    fn permission_parses_cli_spellings() {
        assert_eq!("read-only".parse::<Permission>().unwrap(), Permission::ReadOnly);
        assert_eq!("READ_ONLY".parse::<Permission>().unwrap(), Permission::ReadOnly);
        assert_eq!("Edit".parse::<Permission>().unwrap(), Permission::Edit);
        assert!("admin".parse::<Permission>().is_err());
    }

    #[test]
    fn permission_serializes_in_wire_case() {
        assert_eq!(serde_json::to_string(&Permission::ReadOnly).unwrap(), "\"READ_ONLY\"");
        assert_eq!(serde_json::to_string(&Permission::Edit).unwrap(), "\"EDIT\"");
    }

    #[test]
    fn delete_scope_query_values() {
        assert_eq!(DeleteScope::ForMe.as_query(), "me");
        assert_eq!(DeleteScope::ForEveryone.as_query(), "all");
    }

    #[test]
    fn read_only_collaborator_cannot_edit() {
        let mut note = fixtures::note("n1", "Shared");
        note.is_owned = false;
        note.permission = Permission::ReadOnly;
        assert!(!note.can_edit());
        note.permission = Permission::Edit;
        assert!(note.can_edit());
    }

    #[test]
    fn preview_falls_back_to_content_and_truncates() {
        let mut note = fixtures::note("n1", "  ");
        note.content = "\nThis is a very long sentence that should be shortened".to_string();
        assert_eq!(note.preview(20), "This is a very lo...");
    }

    #[test]
    fn matches_query_is_case_insensitive() {
        let mut note = fixtures::note("n1", "Groceries");
        note.content = "Milk and eggs".to_string();
        assert!(note.matches_query("MILK"));
        assert!(note.matches_query("grocer"));
        assert!(note.matches_query("  "));
        assert!(!note.matches_query("bread"));
    }
}
