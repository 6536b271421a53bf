use snotes_core::SyncState;

use crate::commands::common::{
    capture_editor_input_with_initial, normalize_content, read_piped_stdin, resolve_note, Context,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<&str>,
    content_parts: &[String],
    context: &Context,
) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let note = resolve_note(&store, id).await?;
    if !note.can_edit() {
        return Err(snotes_core::Error::Forbidden(
            "You have read-only access to this note".to_string(),
        )
        .into());
    }

    let title = title.and_then(normalize_content);
    let content = if let Some(content) = normalize_content(&content_parts.join(" ")) {
        content
    } else if title.is_some() {
        note.content.clone()
    } else if let Some(content) = read_piped_stdin()? {
        content
    } else {
        capture_editor_input_with_initial(&note.content)?.ok_or(CliError::EmptyEditedContent)?
    };
    let title = title.unwrap_or_else(|| note.title.clone());

    let saved = store.save(&note.id, &title, &content).await?;
    if saved.sync == SyncState::Synced {
        println!("{}", saved.id);
    } else {
        println!("{} (newer local edits pending)", saved.id);
    }
    Ok(())
}
