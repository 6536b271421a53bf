//! Search query and sort preference.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::Note;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Created,
    #[default]
    Modified,
    Title,
}

impl SortBy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "modified" | "updated" => Ok(Self::Modified),
            "title" => Ok(Self::Title),
            other => Err(Error::InvalidInput(format!("unknown sort key '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Query text and sort preference, defaulting to last modified first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl SearchState {
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub const fn set_sort_by(&mut self, sort_by: SortBy) {
        self.sort_by = sort_by;
    }

    pub const fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
    }

    pub const fn toggle_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
    }

    fn compare(&self, left: &Note, right: &Note) -> Ordering {
        let ordering = match self.sort_by {
            SortBy::Created => left.created_at.cmp(&right.created_at),
            SortBy::Modified => left.updated_at.cmp(&right.updated_at),
            SortBy::Title => left
                .title
                .to_lowercase()
                .cmp(&right.title.to_lowercase()),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Notes matching the query, sorted. The sort is stable, so ties keep
    /// their list order.
    #[must_use]
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        let mut matching = notes
            .iter()
            .filter(|note| note.matches_query(&self.query))
            .collect::<Vec<_>>();
        matching.sort_by(|left, right| self.compare(left, right));
        matching
    }
}
