//! snotes-core - Core library for Secure Notes
//!
//! This crate contains the shared models, the typed REST client, the
//! client-side stores and their reconciliation logic, and the realtime
//! update channel used by every Secure Notes client.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod realtime;
pub mod state;
pub mod stores;
pub mod util;
pub mod validation;

pub use api::ApiClient;
pub use auth::{AuthState, AuthStore, Session};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{
    Collaborator, DeleteScope, Note, NoteId, Permission, RequestStatus, ShareRequest, TrashNote,
    UserProfile,
};
pub use state::SyncState;
