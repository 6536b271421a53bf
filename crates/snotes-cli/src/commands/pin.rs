use crate::commands::common::{resolve_note, Context};
use crate::error::CliError;

pub async fn run_pin(id: &str, context: &mut Context) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let note = resolve_note(&store, id).await?;

    let pinned = store.toggle_pin(&note.id).await?;
    let mut pins = store.pinned_ids().await.into_iter().collect::<Vec<_>>();
    pins.sort();
    context.save_pins(&pins)?;

    let state = if pinned { "Pinned" } else { "Unpinned" };
    println!("{state} {}", note.id);
    Ok(())
}
