//! Note export in JSON or Markdown, shared by every client.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{Note, Permission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable note representation used in JSON and Markdown exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub owned: bool,
    pub permission: Permission,
    pub created_at: String,
    pub updated_at: String,
}

#[must_use]
pub fn note_to_export_item(note: &Note) -> ExportNote {
    ExportNote {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        pinned: note.is_pinned,
        owned: note.is_owned,
        permission: note.permission,
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
    }
}

pub fn render_json_export(notes: &[Note]) -> serde_json::Result<String> {
    let items = notes
        .iter()
        .map(note_to_export_item)
        .collect::<Vec<ExportNote>>();
    serde_json::to_string_pretty(&items)
}

/// Render notes in Markdown with a frontmatter block per note.
#[must_use]
pub fn render_markdown_export(notes: &[Note]) -> String {
    let mut output = String::new();

    for (index, note) in notes.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let item = note_to_export_item(note);
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", item.id);
        let _ = writeln!(output, "title: {}", yaml_scalar(&item.title));
        let _ = writeln!(output, "pinned: {}", item.pinned);
        let _ = writeln!(output, "owned: {}", item.owned);
        let _ = writeln!(output, "permission: {}", item.permission.as_wire());
        let _ = writeln!(output, "created_at: {}", item.created_at);
        let _ = writeln!(output, "updated_at: {}", item.updated_at);
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        if !item.title.trim().is_empty() {
            let _ = writeln!(output, "# {}", item.title.trim());
            let _ = writeln!(output);
        }
        output.push_str(&item.content);
        output.push('\n');
    }

    output
}

fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.starts_with(' ')
        || value.ends_with(' ')
        || value.contains([':', '#', '"', '\'', '\n']);
    if needs_quotes {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

pub fn render_notes_export(notes: &[Note], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(notes),
        ExportFormat::Markdown => Ok(render_markdown_export(notes)),
    }
}

/// Deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("snotes-export-{timestamp_ms}.{}", format.extension())
}
