use snotes_core::stores::{CollaboratorPanel, CollaboratorStore};
use snotes_core::{Collaborator, Error, Permission};

use crate::cli::ShareCommands;
use crate::commands::common::{resolve_note, Context};
use crate::error::CliError;

pub async fn run_share(command: ShareCommands, context: &Context) -> Result<(), CliError> {
    let notes = context.load_notes().await?;
    let collaborators = CollaboratorStore::new(context.api.clone());

    match command {
        ShareCommands::List { note, json } => {
            let note = resolve_note(&notes, &note).await?;
            collaborators.open_panel(note.id.clone()).await;
            let panel = collaborators.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&panel.collaborators)?);
            } else if panel.collaborators.is_empty() {
                println!("\"{}\" is not shared with anyone.", note.title);
            } else {
                for line in format_collaborator_lines(&panel.collaborators) {
                    println!("{line}");
                }
            }
        }
        ShareCommands::Invite {
            note,
            email,
            permission,
        } => {
            let note = resolve_note(&notes, &note).await?;
            collaborators.open_panel(note.id.clone()).await;
            let result = collaborators.invite(&email, permission.into()).await;
            settle(&collaborators, result).await?;
            println!("Invited {} to \"{}\" (pending)", email.trim(), note.title);
        }
        ShareCommands::Permission {
            note,
            user,
            permission,
        } => {
            let note = resolve_note(&notes, &note).await?;
            collaborators.open_panel(note.id.clone()).await;
            let user_id = find_collaborator(&collaborators.snapshot().await, &user)?;
            let permission = Permission::from(permission);
            let result = collaborators.update_permission(&user_id, permission).await;
            settle(&collaborators, result).await?;
            println!("{user_id} {}", permission.label().to_lowercase());
        }
        ShareCommands::Remove { note, user } => {
            let note = resolve_note(&notes, &note).await?;
            collaborators.open_panel(note.id.clone()).await;
            let user_id = find_collaborator(&collaborators.snapshot().await, &user)?;
            let result = collaborators.remove(&user_id).await;
            settle(&collaborators, result).await?;
            println!("Removed {user_id} from \"{}\"", note.title);
        }
    }
    Ok(())
}

/// Surface the panel's error text for failed actions; session errors keep
/// their type so the sign-in hint is shown.
async fn settle(
    store: &CollaboratorStore,
    result: snotes_core::Result<()>,
) -> Result<(), CliError> {
    match result {
        Ok(()) => Ok(()),
        Err(error @ (Error::Unauthorized | Error::NotAuthenticated)) => Err(error.into()),
        Err(error) => match store.snapshot().await.error {
            Some(message) => Err(CliError::Collaborators(message)),
            None => Err(error.into()),
        },
    }
}

/// Match a collaborator by user id or email.
pub fn find_collaborator(panel: &CollaboratorPanel, query: &str) -> Result<String, CliError> {
    let query = query.trim();
    panel
        .get(query)
        .or_else(|| {
            panel
                .collaborators
                .iter()
                .find(|collaborator| collaborator.email.eq_ignore_ascii_case(query))
        })
        .map(|collaborator| collaborator.user_id.clone())
        .ok_or_else(|| CliError::Collaborators(format!("No collaborator matches '{query}'")))
}

pub fn format_collaborator_lines(collaborators: &[Collaborator]) -> Vec<String> {
    collaborators
        .iter()
        .map(|collaborator| {
            let mut line = format!(
                "{}  {} <{}>  {}",
                collaborator.user_id,
                collaborator.name,
                collaborator.email,
                collaborator.permission.label()
            );
            if collaborator.is_owner {
                line.push_str("  (owner)");
            } else if let Some(status) = collaborator.status.filter(|_| !collaborator.has_access()) {
                line.push_str(&format!("  ({})", status.label()));
            }
            line
        })
        .collect()
}
