//! Shared state types.

use serde::{Deserialize, Serialize};

/// Save state of a note in the local list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// Local copy matches the last server response
    #[default]
    Synced,
    /// An update request is in flight
    Saving,
    /// Local edits the server has not accepted yet
    Pending,
}

impl SyncState {
    #[must_use]
    pub const fn has_local_edits(self) -> bool {
        matches!(self, Self::Saving | Self::Pending)
    }
}

/// Realtime socket connection state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}
