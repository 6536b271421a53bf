//! Realtime note updates pushed by the backend.
//!
//! One Socket.IO connection is kept while the session is authenticated. It
//! only delivers events; applying them to a store is up to the consumer.

pub mod protocol;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use self::protocol::{EnginePacket, SocketPacket};
use crate::auth::{AuthState, Session};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::NoteId;
use crate::state::ConnectionState;

/// Event name the backend emits after a note is edited
pub const NOTE_UPDATED_EVENT: &str = "noteUpdated";

/// Pause before reopening a socket the server dropped
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Fields of a note changed elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpdate {
    pub id: NoteId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl NoteUpdate {
    /// Read an update payload. The id may arrive as `note_id`, `noteId` or `id`.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let id = ["note_id", "noteId", "id"]
            .iter()
            .find_map(|key| match payload.get(*key)? {
                Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
            .ok_or_else(|| Error::Realtime("note update without an id".to_string()))?;

        let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);
        let updated_at = text("updatedAt")
            .or_else(|| text("updated_at"))
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|parsed| parsed.with_timezone(&Utc));

        Ok(Self {
            id: NoteId::from(id),
            title: text("title"),
            content: text("content"),
            updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    NoteUpdated(NoteUpdate),
}

/// WebSocket URL for a socket server origin.
pub fn socket_endpoint(base: &str) -> Result<String> {
    let mut url =
        Url::parse(base).map_err(|error| Error::Config(format!("invalid socket URL: {error}")))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::Config(format!(
                "unsupported socket URL scheme '{other}'"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::Config("cannot derive websocket scheme".to_string()))?;
    url.set_path(protocol::SOCKET_PATH);
    url.set_query(Some(protocol::TRANSPORT_QUERY));
    Ok(url.to_string())
}

/// How a socket task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketEnd {
    /// Closed from this side, or nobody listens for events anymore
    Closed,
    /// The server or the transport went away
    Dropped,
    /// The server rejected the Socket.IO handshake
    Refused,
}

/// A live socket. Dropping it disconnects.
pub struct RealtimeConnection {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<SocketEnd>>,
}

impl RealtimeConnection {
    /// Open the socket and authenticate with `token`. Events, including the
    /// outcome of the Socket.IO handshake, arrive on `events`.
    pub async fn connect(
        endpoint: &str,
        token: &str,
        events: mpsc::Sender<RealtimeEvent>,
        state: Arc<watch::Sender<ConnectionState>>,
    ) -> Result<Self> {
        state.send_replace(ConnectionState::Connecting);
        let (stream, _) = match connect_async(endpoint).await {
            Ok(connected) => connected,
            Err(error) => {
                state.send_replace(ConnectionState::Disconnected);
                return Err(error.into());
            }
        };
        tracing::debug!("Socket opened: {}", endpoint);

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_socket(
            stream,
            token.to_string(),
            events,
            state,
            shutdown_rx,
        ));
        Ok(Self {
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// Disconnect and wait for the socket task to finish.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Wait for the socket task to end on its own. Pending forever once the
    /// end has been reported.
    pub async fn ended(&mut self) -> SocketEnd {
        let Some(task) = self.task.as_mut() else {
            return std::future::pending().await;
        };
        let end = task.await.unwrap_or(SocketEnd::Dropped);
        self.task = None;
        end
    }
}

impl Drop for RealtimeConnection {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

type Socket = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn run_socket(
    stream: Socket,
    token: String,
    events: mpsc::Sender<RealtimeEvent>,
    state: Arc<watch::Sender<ConnectionState>>,
    mut shutdown: oneshot::Receiver<()>,
) -> SocketEnd {
    let (mut write, mut read) = stream.split();

    let end = loop {
        let frame = tokio::select! {
            _ = &mut shutdown => {
                let _ = write.send(Message::Text(protocol::DISCONNECT.into())).await;
                let _ = write.close().await;
                tracing::debug!("Socket closed by client");
                break SocketEnd::Closed;
            }
            frame = read.next() => frame,
        };

        let text = match frame {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!("Socket closed by server");
                break SocketEnd::Dropped;
            }
            Some(Ok(_)) => continue,
            Some(Err(error)) => {
                tracing::warn!("Socket error: {}", error);
                break SocketEnd::Dropped;
            }
        };

        let packet = match protocol::decode_engine(text.as_str()) {
            Ok(packet) => packet,
            Err(error) => {
                tracing::debug!("Ignoring frame: {}", error);
                continue;
            }
        };

        let reply = match packet {
            EnginePacket::Open(handshake) => {
                tracing::debug!(sid = %handshake.sid, "Engine.IO session opened");
                Some(protocol::encode_connect(&token))
            }
            EnginePacket::Ping => Some(protocol::PONG.to_string()),
            EnginePacket::Close => break SocketEnd::Dropped,
            EnginePacket::Message(body) => {
                match handle_socket_packet(&body, &events, &state).await {
                    Flow::Continue => None,
                    Flow::End(end) => break end,
                }
            }
            EnginePacket::Pong | EnginePacket::Upgrade | EnginePacket::Noop => None,
        };

        if let Some(reply) = reply {
            if let Err(error) = write.send(Message::Text(reply.into())).await {
                tracing::warn!("Socket write failed: {}", error);
                break SocketEnd::Dropped;
            }
        }
    };

    state.send_replace(ConnectionState::Disconnected);
    let _ = events.send(RealtimeEvent::Disconnected).await;
    end
}

enum Flow {
    Continue,
    End(SocketEnd),
}

async fn handle_socket_packet(
    body: &str,
    events: &mpsc::Sender<RealtimeEvent>,
    state: &watch::Sender<ConnectionState>,
) -> Flow {
    let event = match protocol::decode_socket(body) {
        Ok(SocketPacket::Connect(_)) => {
            state.send_replace(ConnectionState::Connected);
            tracing::info!("Realtime updates connected");
            RealtimeEvent::Connected
        }
        Ok(SocketPacket::ConnectError(message)) => {
            tracing::warn!("Realtime connection refused: {}", message);
            let _ = events.send(RealtimeEvent::ConnectError(message)).await;
            return Flow::End(SocketEnd::Refused);
        }
        Ok(SocketPacket::Disconnect) => return Flow::End(SocketEnd::Dropped),
        Ok(SocketPacket::Event { name, payload }) if name == NOTE_UPDATED_EVENT => {
            match NoteUpdate::from_payload(&payload) {
                Ok(update) => RealtimeEvent::NoteUpdated(update),
                Err(error) => {
                    tracing::warn!("Dropping malformed {} event: {}", name, error);
                    return Flow::Continue;
                }
            }
        }
        Ok(SocketPacket::Event { name, .. }) => {
            tracing::debug!("Ignoring socket event {}", name);
            return Flow::Continue;
        }
        Ok(SocketPacket::Ack) => return Flow::Continue,
        Err(error) => {
            tracing::debug!("Ignoring socket packet: {}", error);
            return Flow::Continue;
        }
    };

    if events.send(event).await.is_err() {
        // Nobody is listening anymore.
        return Flow::End(SocketEnd::Closed);
    }
    Flow::Continue
}

/// Keeps one socket open while the session is authenticated.
///
/// Reconnects when the token changes or the server drops the socket,
/// disconnects on logout, and tears the socket down when dropped. A refused
/// handshake is not retried until the token changes.
pub struct SocketSupervisor {
    task: JoinHandle<()>,
    state: watch::Receiver<ConnectionState>,
}

impl SocketSupervisor {
    pub fn spawn(
        config: &ClientConfig,
        session: &Session,
        events: mpsc::Sender<RealtimeEvent>,
    ) -> Result<Self> {
        let endpoint = socket_endpoint(&config.socket_base_url()?)?;
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let task = tokio::spawn(supervise(
            endpoint,
            session.subscribe(),
            events,
            Arc::new(state_tx),
        ));
        Ok(Self { task, state })
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

impl Drop for SocketSupervisor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn supervise(
    endpoint: String,
    mut auth: watch::Receiver<AuthState>,
    events: mpsc::Sender<RealtimeEvent>,
    state: Arc<watch::Sender<ConnectionState>>,
) {
    let mut current: Option<(String, RealtimeConnection)> = None;

    loop {
        let snapshot = auth.borrow_and_update().clone();
        let mut retry = false;
        match snapshot.token.filter(|_| snapshot.is_authenticated) {
            Some(token) => {
                let already_connected = current
                    .as_ref()
                    .is_some_and(|(connected_token, _)| *connected_token == token);
                if !already_connected {
                    if let Some((_, previous)) = current.take() {
                        previous.close().await;
                    }
                    match RealtimeConnection::connect(&endpoint, &token, events.clone(), state.clone())
                        .await
                    {
                        Ok(connection) => current = Some((token, connection)),
                        Err(error) => {
                            tracing::warn!("Realtime connection failed: {}", error);
                            let _ = events
                                .send(RealtimeEvent::ConnectError(error.to_string()))
                                .await;
                            retry = true;
                        }
                    }
                }
            }
            None => {
                if let Some((_, connection)) = current.take() {
                    tracing::info!("Signed out; closing realtime connection");
                    connection.close().await;
                }
            }
        }

        let ended = tokio::select! {
            changed = auth.changed() => {
                if changed.is_err() {
                    break;
                }
                None
            }
            end = connection_ended(&mut current) => Some(end),
            () = tokio::time::sleep(RECONNECT_DELAY), if retry => None,
        };

        match ended {
            Some(SocketEnd::Dropped) => {
                tracing::info!("Realtime connection lost; reconnecting");
                current = None;
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
            // Keep the dead connection so the same token is not retried.
            Some(SocketEnd::Refused | SocketEnd::Closed) | None => {}
        }
    }
}

async fn connection_ended(current: &mut Option<(String, RealtimeConnection)>) -> SocketEnd {
    match current {
        Some((_, connection)) => connection.ended().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoint_swaps_scheme_and_path() {
        assert_eq!(
            socket_endpoint("http://localhost:3001").unwrap(),
            "ws://localhost:3001/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_endpoint("https://notes.example.com/").unwrap(),
            "wss://notes.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert!(socket_endpoint("ftp://example.com").is_err());
    }

    #[test]
    fn update_reads_any_id_spelling() {
        for key in ["note_id", "noteId", "id"] {
            let update = NoteUpdate::from_payload(&json!({ key: "n1", "title": "T" })).unwrap();
            assert_eq!(update.id.as_str(), "n1");
            assert_eq!(update.title.as_deref(), Some("T"));
            assert_eq!(update.content, None);
        }
        let numeric = NoteUpdate::from_payload(&json!({ "id": 7 })).unwrap();
        assert_eq!(numeric.id.as_str(), "7");
    }

    #[test]
    fn update_parses_timestamp_and_requires_id() {
        let update = NoteUpdate::from_payload(&json!({
            "note_id": "n1",
            "content": "body",
            "updatedAt": "2024-05-02T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(
            update.updated_at.unwrap().to_rfc3339(),
            "2024-05-02T10:00:00+00:00"
        );
        assert!(NoteUpdate::from_payload(&json!({ "title": "x" })).is_err());
        assert!(NoteUpdate::from_payload(&json!({ "id": "  " })).is_err());
    }
}
