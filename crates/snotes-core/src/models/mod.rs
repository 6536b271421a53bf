//! Data models for Secure Notes

mod collaborator;
mod note;
mod share;
mod trash;
mod user;

pub use collaborator::Collaborator;
pub use note::{DeleteScope, Note, NoteId, Permission};
pub use share::{NoteRef, RequestStatus, ShareAction, ShareRequest, UserSummary};
pub use trash::TrashNote;
pub use user::UserProfile;

#[cfg(test)]
pub(crate) use note::fixtures;
