//! Client-side stores.
//!
//! Each store is a cheap `Clone` handle over shared state plus an
//! [`ApiClient`](crate::ApiClient). Actions snapshot what they need, release
//! the lock, call the backend, then re-lock to reconcile the response.

pub mod autosave;
pub mod collaborators;
pub mod notes;
pub mod requests;
pub mod search;
pub mod trash;

pub use autosave::AutoSaver;
pub use collaborators::{CollaboratorPanel, CollaboratorStore};
pub use notes::{NotesList, NotesStore, NotesView};
pub use requests::{RequestList, RequestsStore};
pub use search::{SearchState, SortBy, SortOrder};
pub use trash::TrashStore;
