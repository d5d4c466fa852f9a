//! Invite API integration tests

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::*;

async fn invite(app: &TestApp, from: &TestUser, channel: &str, target: &str) -> axum_test::TestResponse {
    post_as(
        &app.server,
        from,
        "/api/invites",
        json!({ "channel_name": channel, "target": target }),
    )
    .await
}

fn invite_id(response: &axum_test::TestResponse) -> Uuid {
    let body: Value = response.json();
    body["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()).expect("invite id")
}

#[tokio::test]
async fn test_private_channel_invite_flow() {
    let app = spawn_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let channel_id = create_channel(&app.server, &alice, "secret-base", false).await;

    let created = invite(&app, &alice, "Secret-Base", "BOB").await;
    created.assert_status(StatusCode::CREATED);
    let id = invite_id(&created);

    let pending: Value = get_as(&app.server, &bob, "/api/invites").await.json();
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], id.to_string());
    assert_eq!(pending[0]["channel_name"], "secret-base");
    assert_eq!(pending[0]["channel_public"], false);
    assert_eq!(pending[0]["creator_id"], alice.id.to_string());
    assert_eq!(pending[0]["status"], "pending");

    let accepted = post_as(
        &app.server,
        &bob,
        "/api/invites/respond",
        json!({ "invite_id": id, "action": "accept" }),
    )
    .await;
    accepted.assert_status_ok();
    let body: Value = accepted.json();
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["channel"]["id"], channel_id.to_string());

    get_as(&app.server, &bob, &format!("/api/channels/{}/messages", channel_id))
        .await
        .assert_status_ok();

    post_as(
        &app.server,
        &bob,
        "/api/invites/respond",
        json!({ "invite_id": id, "action": "accept" }),
    )
    .await
    .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invite_lets_private_join() {
    let app = spawn_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    create_channel(&app.server, &alice, "vault", false).await;

    invite(&app, &alice, "vault", "bob").await.assert_status(StatusCode::CREATED);
    join_channel(&app.server, &bob, "vault").await;

    let pending: Value = get_as(&app.server, &bob, "/api/invites").await.json();
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn test_invite_validation_and_lookups() {
    let app = spawn_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let carol = register_user(&app.server, "carol").await;
    create_channel(&app.server, &alice, "lounge", true).await;
    join_channel(&app.server, &bob, "lounge").await;

    invite(&app, &alice, "   ", "bob").await.assert_status(StatusCode::BAD_REQUEST);
    invite(&app, &alice, "lounge", "  ").await.assert_status(StatusCode::BAD_REQUEST);
    invite(&app, &alice, "nowhere", "bob").await.assert_status(StatusCode::NOT_FOUND);
    invite(&app, &alice, "lounge", "ghost").await.assert_status(StatusCode::NOT_FOUND);
    invite(&app, &alice, "lounge", "bob").await.assert_status(StatusCode::CONFLICT);
    invite(&app, &carol, "lounge", "bob").await.assert_status(StatusCode::FORBIDDEN);

    // Any member may invite to a public channel.
    invite(&app, &bob, "lounge", "carol").await.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_respond_errors() {
    let app = spawn_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let carol = register_user(&app.server, "carol").await;
    create_channel(&app.server, &alice, "lounge", true).await;
    let id = invite_id(&invite(&app, &alice, "lounge", "bob").await);

    post_as(&app.server, &bob, "/api/invites/respond", json!({ "invite_id": id, "action": "ignore" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    post_as(&app.server, &carol, "/api/invites/respond", json!({ "invite_id": id, "action": "accept" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    post_as(
        &app.server,
        &bob,
        "/api/invites/respond",
        json!({ "invite_id": Uuid::new_v4(), "action": "accept" }),
    )
    .await
    .assert_status(StatusCode::NOT_FOUND);

    let declined: Value =
        post_as(&app.server, &bob, "/api/invites/respond", json!({ "invite_id": id, "action": "decline" }))
            .await
            .json();
    assert_eq!(declined["status"], "declined");
    assert!(declined.get("channel").is_none());

    let channels: Value = get_as(&app.server, &bob, "/api/channels").await.json();
    assert_eq!(channels, json!([]));
}
