use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::Serialize;
use snotes_core::auth::SessionPersistence;
use snotes_core::stores::{NotesStore, SearchState};
use snotes_core::{ApiClient, AuthStore, ClientConfig, Note, NoteId, Permission, Session};

use crate::auth::KeychainSessionStore;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;
const TITLE_FROM_CONTENT_CHARS: usize = 60;

/// Profile, session and API client for one command invocation
pub struct Context {
    pub profile_name: String,
    pub config: CliProfilesConfig,
    pub api: ApiClient,
}

impl Context {
    pub fn load(explicit_profile: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(explicit_profile);
        let client_config = config
            .profile(&profile_name)
            .cloned()
            .unwrap_or_default()
            .client_config()?;
        let persistence = Arc::new(KeychainSessionStore::new(&profile_name));
        Self::new(config, profile_name, client_config, persistence)
    }

    pub fn new(
        config: CliProfilesConfig,
        profile_name: String,
        client_config: ClientConfig,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Result<Self, CliError> {
        let api = ApiClient::new(client_config, Session::new(persistence))?;
        let context = Self {
            profile_name,
            config,
            api,
        };
        context.auth().restore()?;
        Ok(context)
    }

    pub fn auth(&self) -> AuthStore {
        AuthStore::new(self.api.clone())
    }

    pub fn require_session(&self) -> Result<(), CliError> {
        if self.api.session().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn(self.profile_name.clone()))
        }
    }

    pub fn profile(&self) -> CliProfile {
        self.config
            .profile(&self.profile_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Load owned and shared notes with this profile's pins applied.
    pub async fn load_notes(&self) -> Result<NotesStore, CliError> {
        self.require_session()?;
        let store = NotesStore::new(self.api.clone());
        store.load().await?;
        store.set_pinned(&self.profile().pinned_ids()).await;
        Ok(store)
    }

    pub fn save_pins<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a NoteId>,
    ) -> Result<PathBuf, CliError> {
        self.config
            .profile_mut_or_default(&self.profile_name)
            .set_pinned_ids(ids);
        self.config.save().map_err(CliError::Config)
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub pinned: bool,
    pub owned: bool,
    pub permission: Permission,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

/// Filter, sort and split pinned first, then truncate to `limit`.
pub async fn view_notes(
    store: &NotesStore,
    search: &SearchState,
    limit: Option<usize>,
) -> Vec<Note> {
    let view = store.view(search).await;
    let notes = view.pinned.into_iter().chain(view.others);
    match limit {
        Some(limit) => notes.take(limit).collect(),
        None => notes.collect(),
    }
}

/// Exact id first, then a unique id prefix.
pub fn resolve_by_id<'a, T>(
    query: &str,
    items: &'a [T],
    id_of: impl Fn(&T) -> &str,
) -> Result<&'a T, CliError> {
    let query = normalize_note_identifier(query)?;
    if let Some(item) = items.iter().find(|item| id_of(item) == query) {
        return Ok(item);
    }

    let matches = items
        .iter()
        .filter(|item| id_of(item).starts_with(&query))
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [item] => Ok(item),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|item| short_id(id_of(item)))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub async fn resolve_note(store: &NotesStore, query: &str) -> Result<Note, CliError> {
    let notes = store.snapshot().await;
    resolve_by_id(query, &notes, |note| note.id.as_str()).cloned()
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let id = short_id(note.id.as_str());
            let preview = note.preview(40);
            let relative_time = format_relative_time(note.updated_at, now);
            let marker = if note.is_pinned { "*" } else { " " };
            let access = if note.is_owned {
                String::new()
            } else {
                format!("  [shared, {}]", note.permission.label().to_lowercase())
            };
            format!("{marker} {id:<13}  {preview:<40}  {relative_time:<10}{access}")
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note.preview(80),
        content: note.content.clone(),
        pinned: note.is_pinned,
        owned: note.is_owned,
        permission: note.permission,
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
        relative_time: format_relative_time(note.updated_at, Utc::now()),
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - at).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Title for a note captured without one: the first line of its content.
pub fn title_from_content(content: &str) -> String {
    let first_line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= TITLE_FROM_CONTENT_CHARS {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(TITLE_FROM_CONTENT_CHARS - 3)
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("snotes-note-{}-{now}.md", std::process::id()))
}
