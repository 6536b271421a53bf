//! In-process mock of the Secure Notes backend (REST + Socket.IO).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use snotes_core::auth::Session;
use snotes_core::models::UserProfile;
use snotes_core::{ApiClient, ClientConfig};
use tokio::task::JoinHandle;

pub const TOKEN: &str = "tok-1";
pub const PASSWORD: &str = "Secret123";
pub const USER_ID: &str = "me";
pub const UPDATED_AT: &str = "2024-06-01T12:00:00.000Z";

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Value,
}

pub struct Backend {
    pub token: String,
    pub calls: Vec<Call>,
    pub user: Value,
    pub owned: Vec<Value>,
    pub other: Vec<Value>,
    pub details: HashMap<String, Value>,
    pub requests: Vec<Value>,
    pub trash: Vec<Value>,
    pub fail_updates: bool,
    pub fail_permission: bool,
    pub fail_revoke: bool,
    pub socket_events: Vec<Value>,
    pub socket_frames: Vec<String>,
    /// Close the first accepted socket right after its greeting frames
    pub drop_first_socket: bool,
    pub socket_connections: usize,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            token: TOKEN.to_string(),
            calls: Vec::new(),
            user: json!({
                "user_id": USER_ID,
                "name": "Jane Doe",
                "email": "jane@example.com",
                "createdAt": "2024-01-01T00:00:00.000Z"
            }),
            owned: Vec::new(),
            other: Vec::new(),
            details: HashMap::new(),
            requests: Vec::new(),
            trash: Vec::new(),
            fail_updates: false,
            fail_permission: false,
            fail_revoke: false,
            socket_events: Vec::new(),
            socket_frames: Vec::new(),
            drop_first_socket: false,
            socket_connections: 0,
        }
    }
}

type Shared = Arc<Mutex<Backend>>;

pub struct MockServer {
    pub origin: String,
    pub state: Shared,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(backend: Backend) -> Self {
        let state = Arc::new(Mutex::new(backend));

        let protected = Router::new()
            .route("/users/me", get(current_user).patch(update_user))
            .route("/notes", post(create_note))
            .route("/notes/all", get(all_notes))
            .route("/notes/trash", get(trash))
            .route(
                "/notes/{id}",
                get(get_note).patch(update_note).delete(delete_note),
            )
            .route("/notes/{id}/download", get(download_note))
            .route("/notes/{id}/restore", patch(ok))
            .route("/share", post(create_share))
            .route("/share/requests", get(share_requests))
            .route("/share/respond", post(ok))
            .route("/share/permission", patch(update_permission))
            .route("/share/revoke/{note_id}/{user_id}", delete(revoke))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/signup", post(signup))
            .merge(protected)
            .layer(middleware::from_fn_with_state(state.clone(), record));

        let app = Router::new()
            .nest("/securenotes", api)
            .route("/socket.io/", get(socket))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let address = listener.local_addr().expect("local address");
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            origin: format!("http://{address}"),
            state,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/securenotes", self.origin)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url()).expect("valid config")
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.config(), Session::in_memory()).expect("client")
    }

    /// Client whose session already holds the backend's token and profile.
    pub fn signed_in_client(&self) -> ApiClient {
        let session = Session::in_memory();
        session
            .establish(TOKEN.to_string(), Some(profile()))
            .expect("establish session");
        ApiClient::new(self.config(), session).expect("client")
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Backend) -> R) -> R {
        f(&mut self.state.lock().expect("backend lock"))
    }

    pub fn calls_to(&self, method: &str, path: &str) -> Vec<Call> {
        self.with(|backend| {
            backend
                .calls
                .iter()
                .filter(|call| call.method == method && call.path == path)
                .cloned()
                .collect()
        })
    }

    /// Wait until the socket server has seen `frame`.
    pub async fn wait_for_socket_frame(&self, frame: &str) -> bool {
        for _ in 0..100 {
            if self.with(|backend| backend.socket_frames.iter().any(|seen| seen == frame)) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        user_id: USER_ID.to_string(),
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        created_at: None,
        updated_at: None,
    }
}

pub fn note_json(id: &str, owner: &str, title: &str, content: &str) -> Value {
    json!({
        "note_id": id,
        "user_id": owner,
        "title": title,
        "content": content,
        "createdAt": "2024-05-01T10:00:00.000Z",
        "updatedAt": "2024-05-02T10:00:00.000Z"
    })
}

pub fn receiver_request(request_id: &str, user_id: &str, status: &str, permission: &str) -> Value {
    json!({
        "request_id": request_id,
        "status": status,
        "permission": permission,
        "receiver": {
            "user_id": user_id,
            "name": "",
            "email": format!("{user_id}@example.com")
        },
        "createdAt": "2024-05-03T10:00:00.000Z"
    })
}

pub fn share_request(request_id: &str, status: &str, created_at: &str) -> Value {
    json!({
        "request_id": request_id,
        "status": status,
        "permission": "EDIT",
        "description": "Need to add Q4 updates",
        "createdAt": created_at,
        "sender": { "user_id": "alice", "name": "Alice Walker", "email": "alice@example.com" },
        "note": { "note_id": "n1", "title": "Q4 Report" }
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "statusCode": status.as_u16() }))).into_response()
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    state.lock().expect("backend lock").calls.push(Call {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        body,
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn require_token(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.lock().expect("backend lock").token);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented != Some(expected.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    next.run(request).await
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let token = state.lock().expect("backend lock").token.clone();
    Json(json!({ "access_token": token })).into_response()
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    (
        StatusCode::CREATED,
        Json(json!({ "user_id": "u-new", "email": body["email"] })),
    )
        .into_response()
}

async fn current_user(State(state): State<Shared>) -> Json<Value> {
    Json(state.lock().expect("backend lock").user.clone())
}

async fn update_user(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut backend = state.lock().expect("backend lock");
    backend.user["name"] = body["name"].clone();
    Json(backend.user.clone())
}

async fn all_notes(State(state): State<Shared>) -> Json<Value> {
    let backend = state.lock().expect("backend lock");
    Json(json!({ "owned": backend.owned, "other": backend.other }))
}

async fn create_note(Json(body): Json<Value>) -> Response {
    let mut note = note_json(
        "n-new",
        USER_ID,
        body["title"].as_str().unwrap_or_default(),
        body["content"].as_str().unwrap_or_default(),
    );
    note["updatedAt"] = json!(UPDATED_AT);
    (StatusCode::CREATED, Json(note)).into_response()
}

async fn get_note(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match state.lock().expect("backend lock").details.get(&id) {
        Some(note) => Json(note.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn update_note(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if state.lock().expect("backend lock").fail_updates {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    Json(json!({
        "note_id": id,
        "user_id": USER_ID,
        "title": body.get("title").cloned().unwrap_or(Value::Null),
        "updatedAt": UPDATED_AT
    }))
    .into_response()
}

async fn delete_note() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn download_note(Path(id): Path<String>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/markdown")],
        format!("# {id}\n\nexported body\n"),
    )
        .into_response()
}

async fn trash(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().expect("backend lock").trash.clone()))
}

async fn ok() -> StatusCode {
    StatusCode::OK
}

async fn create_share(Json(body): Json<Value>) -> Response {
    if body["receiverEmail"] == "ghost@example.com" {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    StatusCode::CREATED.into_response()
}

async fn share_requests(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().expect("backend lock").requests.clone()))
}

/// Requests stored on a note, as `GET /notes/:id` returns them.
fn note_requests<'a>(backend: &'a mut Backend, note_id: &str) -> Option<&'a mut Vec<Value>> {
    backend.details.get_mut(note_id)?["requests"].as_array_mut()
}

async fn update_permission(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut backend = state.lock().expect("backend lock");
    if backend.fail_permission {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Permission update failed");
    }
    let note_id = body["noteId"].as_str().unwrap_or_default();
    if let Some(requests) = note_requests(&mut backend, note_id) {
        for request in requests
            .iter_mut()
            .filter(|request| request["receiver"]["user_id"] == body["userId"])
        {
            request["permission"] = body["permission"].clone();
        }
    }
    StatusCode::OK.into_response()
}

async fn revoke(
    State(state): State<Shared>,
    Path((note_id, user_id)): Path<(String, String)>,
) -> Response {
    let mut backend = state.lock().expect("backend lock");
    if backend.fail_revoke {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Revoke failed");
    }
    if let Some(requests) = note_requests(&mut backend, &note_id) {
        requests.retain(|request| request["receiver"]["user_id"] != user_id.as_str());
    }
    StatusCode::OK.into_response()
}

async fn socket(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    if params.get("EIO").map(String::as_str) != Some("4")
        || params.get("transport").map(String::as_str) != Some("websocket")
    {
        return error(StatusCode::BAD_REQUEST, "Unsupported protocol version");
    }
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: Shared) {
    let open = r#"0{"sid":"eio-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
    if socket.send(Message::Text(open.into())).await.is_err() {
        return;
    }

    let Some(Ok(Message::Text(connect))) = socket.recv().await else {
        return;
    };
    let (expected, events) = {
        let mut backend = state.lock().expect("backend lock");
        backend.socket_frames.push(connect.as_str().to_string());
        (
            format!("40{}", json!({ "token": backend.token })),
            backend.socket_events.clone(),
        )
    };

    if connect.as_str() != expected {
        let _ = socket
            .send(Message::Text(r#"44{"message":"Unauthorized"}"#.into()))
            .await;
        return;
    }
    let drop_after_greeting = {
        let mut backend = state.lock().expect("backend lock");
        backend.socket_connections += 1;
        backend.drop_first_socket && backend.socket_connections == 1
    };

    let mut outgoing = vec![r#"40{"sid":"sio-1"}"#.to_string(), "2".to_string()];
    outgoing.extend(
        events
            .iter()
            .map(|payload| format!("42{}", json!(["noteUpdated", payload]))),
    );
    for frame in outgoing {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    if drop_after_greeting {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => state
                .lock()
                .expect("backend lock")
                .socket_frames
                .push(text.as_str().to_string()),
            Message::Close(_) => break,
            _ => {}
        }
    }
}
