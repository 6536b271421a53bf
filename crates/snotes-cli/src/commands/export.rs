use std::path::Path;

use snotes_core::export::render_notes_export;
use snotes_core::stores::SearchState;

use crate::cli::ExportFormat;
use crate::commands::common::{view_notes, Context};
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    context: &Context,
) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let notes = view_notes(&store, &SearchState::default(), None).await;
    let rendered = render_notes_export(&notes, format.into())?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
