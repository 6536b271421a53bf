//! Engine.IO v4 / Socket.IO v4 text framing over a WebSocket.
//!
//! Every WebSocket text frame is one Engine.IO packet: a type digit followed
//! by its payload. Engine.IO `message` packets (`4`) carry a Socket.IO packet,
//! itself a type digit, an optional `/namespace,`, an optional ack id and a
//! JSON body. Only the default namespace and text packets are used.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Query string selecting Engine.IO v4 over a raw WebSocket
pub const TRANSPORT_QUERY: &str = "EIO=4&transport=websocket";
pub const SOCKET_PATH: &str = "/socket.io/";

pub const PONG: &str = "3";
pub const DISCONNECT: &str = "41";

/// Engine.IO `open` payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(String),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Value),
    Disconnect,
    Event { name: String, payload: Value },
    Ack,
    ConnectError(String),
}

pub fn decode_engine(frame: &str) -> Result<EnginePacket> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Realtime("empty engine packet".to_string()))?;
    let body = chars.as_str();

    match kind {
        '0' => {
            let handshake = serde_json::from_str(body)
                .map_err(|error| Error::Realtime(format!("invalid open packet: {error}")))?;
            Ok(EnginePacket::Open(handshake))
        }
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping),
        '3' => Ok(EnginePacket::Pong),
        '4' => Ok(EnginePacket::Message(body.to_string())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(Error::Realtime(format!("unknown engine packet type '{other}'"))),
    }
}

/// Decode the Socket.IO packet carried by an Engine.IO message.
pub fn decode_socket(message: &str) -> Result<SocketPacket> {
    let mut chars = message.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Realtime("empty socket packet".to_string()))?;
    let body = strip_ack_id(strip_namespace(chars.as_str()));

    match kind {
        '0' => Ok(SocketPacket::Connect(parse_body(body)?)),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            let Value::Array(mut items) = parse_body(body)? else {
                return Err(Error::Realtime("event body is not an array".to_string()));
            };
            if items.is_empty() {
                return Err(Error::Realtime("event without a name".to_string()));
            }
            let Value::String(name) = items.remove(0) else {
                return Err(Error::Realtime("event name is not a string".to_string()));
            };
            let payload = if items.is_empty() {
                Value::Null
            } else {
                items.swap_remove(0)
            };
            Ok(SocketPacket::Event { name, payload })
        }
        '3' => Ok(SocketPacket::Ack),
        '4' => Ok(SocketPacket::ConnectError(connect_error_message(&parse_body(
            body,
        )?))),
        '5' | '6' => Err(Error::Realtime("binary packets are not supported".to_string())),
        other => Err(Error::Realtime(format!("unknown socket packet type '{other}'"))),
    }
}

/// Engine.IO message carrying a Socket.IO `CONNECT` with the auth payload.
#[must_use]
pub fn encode_connect(token: &str) -> String {
    format!("40{}", json!({ "token": token }))
}

/// Engine.IO message carrying a Socket.IO event.
#[must_use]
pub fn encode_event(name: &str, payload: &Value) -> String {
    format!("42{}", json!([name, payload]))
}

fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    }
}

fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|error| Error::Realtime(format!("invalid socket payload: {error}")))
}

fn connect_error_message(payload: &Value) -> String {
    match payload {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("connection refused")
            .to_string(),
        _ => "connection refused".to_string(),
    }
}
