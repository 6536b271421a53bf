use snotes_core::DeleteScope;

use crate::cli::DeleteScopeArg;
use crate::commands::common::{resolve_note, Context};
use crate::error::CliError;

pub async fn run_delete(
    id: &str,
    scope: DeleteScopeArg,
    context: &mut Context,
) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let note = resolve_note(&store, id).await?;

    store.delete(&note.id, DeleteScope::from(scope)).await?;

    let mut pins = context.profile().pinned_ids();
    if pins.contains(&note.id) {
        pins.retain(|pinned| pinned != &note.id);
        context.save_pins(&pins)?;
    }

    println!("{}", note.id);
    Ok(())
}
