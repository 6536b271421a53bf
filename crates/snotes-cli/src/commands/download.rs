use std::path::{Path, PathBuf};

use crate::commands::common::{resolve_note, Context};
use crate::error::CliError;

pub async fn run_download(
    id: &str,
    output_path: Option<&Path>,
    context: &Context,
) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let note = resolve_note(&store, id).await?;

    let bytes = context.api.download_note(&note.id).await?;
    let path = output_path.map_or_else(
        || default_download_path(note.id.as_str()),
        Path::to_path_buf,
    );
    std::fs::write(&path, bytes)?;

    println!("{}", path.display());
    Ok(())
}

pub fn default_download_path(id: &str) -> PathBuf {
    let safe = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    PathBuf::from(format!("{safe}.txt"))
}
