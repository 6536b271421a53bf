use snotes_core::stores::SearchState;

use crate::cli::SortArgs;
use crate::commands::common::{
    format_note_lines, normalize_search_query, note_to_list_item, view_notes, Context,
    NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(
    query: Option<&str>,
    sort: SortArgs,
    limit: Option<usize>,
    as_json: bool,
    context: &Context,
) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let search = search_state(query.unwrap_or_default(), sort);
    let notes = view_notes(&store, &search, limit).await;

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes found.");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_search(
    query: &str,
    sort: SortArgs,
    limit: Option<usize>,
    as_json: bool,
    context: &Context,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    run_list(Some(&normalized_query), sort, limit, as_json, context).await
}

pub fn search_state(query: &str, sort: SortArgs) -> SearchState {
    let mut search = SearchState::default();
    search.set_query(query.trim());
    search.set_sort_by(sort.sort_by());
    search.set_sort_order(sort.sort_order());
    search
}
