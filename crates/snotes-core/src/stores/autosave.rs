//! Debounced saving for a note being edited.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::notes::NotesStore;
use crate::error::Result;
use crate::models::NoteId;

enum Command {
    Edit { title: String, content: String },
    Flush(oneshot::Sender<Result<()>>),
}

/// Saves the latest edit after `debounce` of inactivity.
///
/// Dropping the handle flushes any pending edit and ends the task.
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl AutoSaver {
    #[must_use]
    pub fn spawn(store: NotesStore, note_id: NoteId, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(store, note_id, debounce, rx));
        Self {
            tx,
            task: Some(task),
        }
    }

    /// Record an edit; restarts the idle timer.
    pub fn edit(&self, title: impl Into<String>, content: impl Into<String>) {
        let command = Command::Edit {
            title: title.into(),
            content: content.into(),
        };
        if self.tx.send(command).is_err() {
            tracing::warn!("Autosave task has stopped; edit dropped");
        }
    }

    /// Save the pending edit now instead of waiting for the timer.
    pub async fn save_now(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        if self.tx.send(Command::Flush(reply)).is_err() {
            return Ok(());
        }
        response.await.unwrap_or(Ok(()))
    }

    /// Flush and wait for the task to finish.
    pub async fn close(mut self) -> Result<()> {
        let result = self.save_now().await;
        if let Some(task) = self.task.take() {
            drop(self);
            let _ = task.await;
        }
        result
    }
}

async fn run(
    store: NotesStore,
    note_id: NoteId,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<(String, String)> = None;

    loop {
        let next = if pending.is_some() {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    save(&store, &note_id, pending.take()).await.ok();
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match next {
            Some(Command::Edit { title, content }) => pending = Some((title, content)),
            Some(Command::Flush(reply)) => {
                let result = save(&store, &note_id, pending.take()).await;
                let _ = reply.send(result);
            }
            None => {
                save(&store, &note_id, pending.take()).await.ok();
                break;
            }
        }
    }

    tracing::debug!("Autosave for note {} stopped", note_id);
}

async fn save(store: &NotesStore, note_id: &NoteId, edit: Option<(String, String)>) -> Result<()> {
    let Some((title, content)) = edit else {
        return Ok(());
    };
    store.save(note_id, &title, &content).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::Session;
    use crate::config::ClientConfig;
    use crate::models::fixtures;

    #[tokio::test]
    async fn save_now_without_edits_is_a_no_op() {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let store = NotesStore::new(ApiClient::new(config, Session::in_memory()).unwrap());
        store.replace_all(vec![fixtures::note("1", "A")]).await;

        let saver = AutoSaver::spawn(store, NoteId::from("1"), Duration::from_secs(60));
        saver.save_now().await.unwrap();
        saver.close().await.unwrap();
    }

    #[tokio::test]
    async fn unchanged_edit_does_not_hit_the_network() {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let store = NotesStore::new(ApiClient::new(config, Session::in_memory()).unwrap());
        store.replace_all(vec![fixtures::note("1", "A")]).await;

        let saver = AutoSaver::spawn(store, NoteId::from("1"), Duration::from_secs(60));
        saver.edit("A", "");
        saver.save_now().await.unwrap();
    }
}
