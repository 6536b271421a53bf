use chrono::{DateTime, Utc};
use serde::Serialize;
use snotes_core::stores::TrashStore;
use snotes_core::TrashNote;

use crate::cli::TrashCommands;
use crate::commands::common::{format_timestamp, resolve_by_id, short_id, Context};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct TrashListItem {
    pub id: String,
    pub title: String,
    pub deleted_at: String,
    pub expires_at: String,
    pub days_remaining: i64,
}

pub async fn run_trash(command: Option<TrashCommands>, context: &Context) -> Result<(), CliError> {
    context.require_session()?;
    let store = TrashStore::new(context.api.clone());
    let notes = store.fetch().await?;

    match command.unwrap_or(TrashCommands::List { json: false }) {
        TrashCommands::List { json } => {
            if json {
                let now = Utc::now();
                let items = notes
                    .iter()
                    .map(|note| trash_to_list_item(note, now))
                    .collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if notes.is_empty() {
                println!("Trash is empty.");
            } else {
                for line in format_trash_lines(&notes, Utc::now()) {
                    println!("{line}");
                }
            }
        }
        TrashCommands::Restore { id } => {
            let note = resolve_by_id(&id, &notes, |note| note.id.as_str())?;
            store.restore(&note.id).await?;
            println!("Restored {}", note.id);
        }
        TrashCommands::Purge { id } => {
            let note = resolve_by_id(&id, &notes, |note| note.id.as_str())?;
            store.delete_forever(&note.id).await?;
            println!("Deleted {} permanently", note.id);
        }
    }
    Ok(())
}

pub fn trash_to_list_item(note: &TrashNote, now: DateTime<Utc>) -> TrashListItem {
    TrashListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        deleted_at: note.deleted_at.to_rfc3339(),
        expires_at: note.expires_at().to_rfc3339(),
        days_remaining: note.days_remaining(now),
    }
}

pub fn format_trash_lines(notes: &[TrashNote], now: DateTime<Utc>) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let days = note.days_remaining(now);
            let remaining = if days == 1 {
                "1 day left".to_string()
            } else {
                format!("{days} days left")
            };
            format!(
                "{:<13}  {:<40}  deleted {}  ({remaining})",
                short_id(note.id.as_str()),
                note.title,
                format_timestamp(note.deleted_at)
            )
        })
        .collect()
}
