mod support;

use pretty_assertions::assert_eq;
use serde_json::json;
use snotes_core::stores::{CollaboratorStore, RequestsStore};
use snotes_core::{Error, NoteId, Permission, RequestStatus};
use support::{note_json, receiver_request, share_request, Backend, MockServer, USER_ID};

fn with_requests() -> Backend {
    Backend {
        requests: vec![
            share_request("r1", "PENDING", "2024-05-01T10:00:00.000Z"),
            share_request("r2", "PENDING", "2024-05-03T10:00:00.000Z"),
            share_request("r3", "REJECTED", "2024-05-02T10:00:00.000Z"),
        ],
        ..Backend::default()
    }
}

fn with_collaborators() -> Backend {
    let mut note = note_json("n1", USER_ID, "Roadmap", "");
    note["requests"] = json!([
        receiver_request("q1", "bob", "ACCEPTED", "READ_ONLY"),
        receiver_request("q2", "carol", "PENDING", "EDIT"),
    ]);
    let mut backend = Backend::default();
    backend.details.insert("n1".to_string(), note);
    backend
}

#[tokio::test]
async fn fetch_orders_requests_newest_first() {
    let server = MockServer::start(with_requests()).await;
    let requests = RequestsStore::new(server.signed_in_client());

    let fetched = requests.fetch().await.unwrap();
    let ids = fetched
        .iter()
        .map(|request| request.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["r2", "r3", "r1"]);
    assert_eq!(requests.pending_count().await, 2);
}

#[tokio::test]
async fn accepting_moves_request_out_of_pending() {
    let server = MockServer::start(with_requests()).await;
    let requests = RequestsStore::new(server.signed_in_client());
    requests.fetch().await.unwrap();

    requests.accept("r1").await.unwrap();

    let calls = server.calls_to("POST", "/share/respond");
    assert_eq!(calls[0].body, json!({ "requestId": "r1", "action": "ACCEPT" }));
    let snapshot = requests.snapshot().await;
    assert_eq!(snapshot.get("r1").unwrap().status, RequestStatus::Accepted);
    assert!(requests
        .pending()
        .await
        .iter()
        .all(|request| request.id != "r1"));
    assert_eq!(requests.pending_count().await, 1);
}

#[tokio::test]
async fn reject_and_local_delete() {
    let server = MockServer::start(with_requests()).await;
    let requests = RequestsStore::new(server.signed_in_client());
    requests.fetch().await.unwrap();

    requests.reject("r2").await.unwrap();
    assert_eq!(
        requests.snapshot().await.get("r2").unwrap().status,
        RequestStatus::Rejected
    );

    requests.delete("r3").await.unwrap();
    assert!(requests.snapshot().await.get("r3").is_none());
    assert_eq!(server.calls_to("POST", "/share/respond").len(), 1);

    assert!(matches!(
        requests.accept("missing").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn open_panel_lists_collaborators_and_ownership() {
    let server = MockServer::start(with_collaborators()).await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());

    collaborators.open_panel(NoteId::from("n1")).await;
    let panel = collaborators.snapshot().await;
    assert!(panel.is_open);
    assert!(panel.is_current_user_owner);
    assert_eq!(panel.collaborators.len(), 2);
    assert_eq!(panel.collaborators[0].name, "bob");
    assert_eq!(panel.collaborators[1].status, Some(RequestStatus::Pending));
}

#[tokio::test]
async fn invite_sends_email_and_refetches() {
    let server = MockServer::start(with_collaborators()).await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());
    collaborators.open_panel(NoteId::from("n1")).await;

    collaborators
        .invite("dave@example.com", Permission::Edit)
        .await
        .unwrap();

    let calls = server.calls_to("POST", "/share");
    assert_eq!(
        calls[0].body,
        json!({ "noteId": "n1", "receiverEmail": "dave@example.com", "permission": "EDIT" })
    );
    assert_eq!(server.calls_to("GET", "/notes/n1").len(), 2);
    assert_eq!(collaborators.snapshot().await.error, None);
}

#[tokio::test]
async fn invite_failure_shows_server_message() {
    let server = MockServer::start(with_collaborators()).await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());
    collaborators.open_panel(NoteId::from("n1")).await;

    assert!(collaborators
        .invite("ghost@example.com", Permission::ReadOnly)
        .await
        .is_err());
    let panel = collaborators.snapshot().await;
    assert_eq!(panel.error.as_deref(), Some("User not found"));
    assert!(!panel.is_loading);
}

#[tokio::test]
async fn permission_change_rolls_back_by_refetch() {
    let server = MockServer::start(Backend {
        fail_permission: true,
        ..with_collaborators()
    })
    .await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());
    collaborators.open_panel(NoteId::from("n1")).await;

    assert!(collaborators
        .update_permission("bob", Permission::Edit)
        .await
        .is_err());

    let panel = collaborators.snapshot().await;
    assert_eq!(panel.get("bob").unwrap().permission, Permission::ReadOnly);
    assert_eq!(panel.error.as_deref(), Some("Permission update failed"));
    assert_eq!(
        server.calls_to("PATCH", "/share/permission")[0].body,
        json!({ "noteId": "n1", "userId": "bob", "permission": "EDIT" })
    );
}

#[tokio::test]
async fn permission_change_sticks_on_success() {
    let server = MockServer::start(with_collaborators()).await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());
    collaborators.open_panel(NoteId::from("n1")).await;

    collaborators
        .update_permission("bob", Permission::Edit)
        .await
        .unwrap();
    let panel = collaborators.snapshot().await;
    assert_eq!(panel.get("bob").unwrap().permission, Permission::Edit);
    assert_eq!(panel.error, None);

    // A fresh fetch agrees with the optimistic change.
    collaborators.fetch(&NoteId::from("n1")).await;
    let panel = collaborators.snapshot().await;
    assert_eq!(panel.get("bob").unwrap().permission, Permission::Edit);
    assert_eq!(panel.get("carol").unwrap().permission, Permission::Edit);
}

#[tokio::test]
async fn remove_drops_collaborator_on_success() {
    let server = MockServer::start(with_collaborators()).await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());
    collaborators.open_panel(NoteId::from("n1")).await;

    collaborators.remove("carol").await.unwrap();
    assert_eq!(server.calls_to("DELETE", "/share/revoke/n1/carol").len(), 1);
    let panel = collaborators.snapshot().await;
    assert!(panel.get("carol").is_none());
    assert_eq!(panel.collaborators.len(), 1);

    collaborators.fetch(&NoteId::from("n1")).await;
    assert!(collaborators.snapshot().await.get("carol").is_none());
}

#[tokio::test]
async fn remove_failure_resyncs_from_server() {
    let server = MockServer::start(Backend {
        fail_revoke: true,
        ..with_collaborators()
    })
    .await;
    let collaborators = CollaboratorStore::new(server.signed_in_client());
    collaborators.open_panel(NoteId::from("n1")).await;

    assert!(collaborators.remove("carol").await.is_err());
    let panel = collaborators.snapshot().await;
    assert!(panel.get("carol").is_some());
    assert_eq!(panel.error.as_deref(), Some("Revoke failed"));
    assert_eq!(server.calls_to("GET", "/notes/n1").len(), 2);
}
