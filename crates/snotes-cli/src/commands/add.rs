use snotes_core::stores::NotesStore;

use crate::commands::common::{
    normalize_content, resolve_note_content, title_from_content, Context,
};
use crate::error::CliError;

pub async fn run_add(
    title: Option<&str>,
    content_parts: &[String],
    context: &Context,
) -> Result<(), CliError> {
    context.require_session()?;
    let content = resolve_note_content(content_parts)?;
    let title = title
        .and_then(normalize_content)
        .unwrap_or_else(|| title_from_content(&content));

    let store = NotesStore::new(context.api.clone());
    let note = store.create(&title, &content).await?;

    println!("{}", note.id);
    Ok(())
}
