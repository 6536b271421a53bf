use serde::Serialize;
use snotes_core::realtime::{NoteUpdate, RealtimeEvent, SocketSupervisor};
use tokio::sync::mpsc;

use crate::commands::common::{format_timestamp, short_id, Context};
use crate::error::CliError;

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Serialize)]
pub struct WatchItem {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: Option<String>,
    /// Whether the note is in this user's list
    pub known: bool,
}

pub async fn run_watch(as_json: bool, context: &Context) -> Result<(), CliError> {
    let store = context.load_notes().await?;
    let (events_tx, mut events) = mpsc::channel(EVENT_BUFFER);
    let supervisor =
        SocketSupervisor::spawn(context.api.config(), context.api.session(), events_tx)?;
    tracing::info!("Watching for note updates; press Ctrl-C to stop");

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    RealtimeEvent::Connected => tracing::info!("Realtime channel connected"),
                    RealtimeEvent::Disconnected => tracing::info!("Realtime channel disconnected"),
                    RealtimeEvent::ConnectError(message) => {
                        tracing::warn!("Realtime connection refused: {}", message);
                    }
                    RealtimeEvent::NoteUpdated(update) => {
                        let known = store.apply_remote_update(&update).await;
                        if as_json {
                            println!("{}", serde_json::to_string(&update_to_item(&update, known))?);
                        } else {
                            println!("{}", format_update_line(&update, known));
                        }
                    }
                }
            }
        }
    }

    drop(supervisor);
    Ok(())
}

pub fn update_to_item(update: &NoteUpdate, known: bool) -> WatchItem {
    WatchItem {
        id: update.id.to_string(),
        title: update.title.clone(),
        content: update.content.clone(),
        updated_at: update.updated_at.map(|at| at.to_rfc3339()),
        known,
    }
}

pub fn format_update_line(update: &NoteUpdate, known: bool) -> String {
    let at = update
        .updated_at
        .map_or_else(|| "-".to_string(), format_timestamp);
    let title = update.title.as_deref().unwrap_or("(title unchanged)");
    let suffix = if known { "" } else { "  [not in your list]" };
    format!("{at}  {:<13}  {title}{suffix}", short_id(update.id.as_str()))
}
