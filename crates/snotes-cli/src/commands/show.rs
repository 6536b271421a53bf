use serde::Serialize;
use snotes_core::Collaborator;

use crate::commands::common::{
    format_timestamp, note_to_list_item, resolve_note, Context, NoteListItem,
};
use crate::commands::share::format_collaborator_lines;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct NoteDetails {
    #[serde(flatten)]
    note: NoteListItem,
    collaborators: Vec<Collaborator>,
}

pub async fn run_show(id: &str, as_json: bool, context: &Context) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let note = resolve_note(&store, id).await?;
    let collaborators = context.api.get_note(&note.id).await?.collaborators();

    if as_json {
        let details = NoteDetails {
            note: note_to_list_item(&note),
            collaborators,
        };
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("{}", note.title);
    println!("id:       {}", note.id);
    if note.is_owned {
        println!("access:   owner");
    } else {
        println!("access:   shared ({})", note.permission.label().to_lowercase());
    }
    println!("created:  {}", format_timestamp(note.created_at));
    println!("modified: {}", format_timestamp(note.updated_at));
    if note.is_pinned {
        println!("pinned:   yes");
    }
    println!();
    println!("{}", note.content);

    if !collaborators.is_empty() {
        println!();
        println!("Collaborators:");
        for line in format_collaborator_lines(&collaborators) {
            println!("  {line}");
        }
    }
    Ok(())
}
