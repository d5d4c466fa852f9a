//! Kick, ban and revoke rules, driven through the HTTP API

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::*;

async fn kick(app: &TestApp, by: &TestUser, channel: &str, target: &str) -> axum_test::TestResponse {
    post_as(
        &app.server,
        by,
        "/api/channels/kick",
        json!({ "name": channel, "nickname": target }),
    )
    .await
}

async fn try_join(app: &TestApp, user: &TestUser, channel: &str) -> axum_test::TestResponse {
    post_as(&app.server, user, "/api/channels/join", json!({ "name": channel })).await
}

#[tokio::test]
async fn test_three_member_kicks_ban() {
    let app = spawn_app().await;
    let owner = register_user(&app.server, "owner").await;
    let voters = [
        register_user(&app.server, "voter1").await,
        register_user(&app.server, "voter2").await,
        register_user(&app.server, "voter3").await,
    ];
    let target = register_user(&app.server, "target").await;
    create_channel(&app.server, &owner, "plaza", true).await;
    for voter in &voters {
        join_channel(&app.server, voter, "plaza").await;
    }
    join_channel(&app.server, &target, "plaza").await;

    let first: Value = kick(&app, &voters[0], "plaza", "target").await.json();
    assert_eq!(first["votes_added"], 1);
    assert_eq!(first["total_votes"], 1);
    assert_eq!(first["banned"], false);

    // Kicked but not banned: can come back.
    try_join(&app, &target, "plaza").await.assert_status_ok();

    kick(&app, &voters[0], "plaza", "target")
        .await
        .assert_status(StatusCode::CONFLICT);

    kick(&app, &voters[1], "plaza", "target").await.assert_status_ok();
    try_join(&app, &target, "plaza").await.assert_status_ok();

    let third: Value = kick(&app, &voters[2], "plaza", "target").await.json();
    assert_eq!(third["total_votes"], 3);
    assert_eq!(third["banned"], true);

    try_join(&app, &target, "plaza").await.assert_status(StatusCode::FORBIDDEN);
    post_as(&app.server, &target, "/api/channels", json!({ "name": "plaza" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_creator_kick_bans_and_creator_invite_lifts() {
    let app = spawn_app().await;
    let owner = register_user(&app.server, "owner").await;
    let member = register_user(&app.server, "member").await;
    let target = register_user(&app.server, "target").await;
    create_channel(&app.server, &owner, "plaza", true).await;
    join_channel(&app.server, &member, "plaza").await;
    join_channel(&app.server, &target, "plaza").await;

    let kicked: Value = kick(&app, &owner, "plaza", "target").await.json();
    assert_eq!(kicked["votes_added"], 3);
    assert_eq!(kicked["banned"], true);
    try_join(&app, &target, "plaza").await.assert_status(StatusCode::FORBIDDEN);

    post_as(
        &app.server,
        &member,
        "/api/invites",
        json!({ "channel_name": "plaza", "target": "target" }),
    )
    .await
    .assert_status(StatusCode::FORBIDDEN);

    post_as(
        &app.server,
        &owner,
        "/api/invites",
        json!({ "channel_name": "plaza", "target": "target" }),
    )
    .await
    .assert_status(StatusCode::CREATED);

    try_join(&app, &target, "plaza").await.assert_status_ok();
}

#[tokio::test]
async fn test_kick_guards() {
    let app = spawn_app().await;
    let owner = register_user(&app.server, "owner").await;
    let member = register_user(&app.server, "member").await;
    let outsider = register_user(&app.server, "outsider").await;
    create_channel(&app.server, &owner, "plaza", true).await;
    create_channel(&app.server, &owner, "backroom", false).await;
    join_channel(&app.server, &member, "plaza").await;

    kick(&app, &member, "plaza", "owner").await.assert_status(StatusCode::FORBIDDEN);
    kick(&app, &member, "plaza", "member").await.assert_status(StatusCode::FORBIDDEN);
    kick(&app, &outsider, "plaza", "member").await.assert_status(StatusCode::FORBIDDEN);
    kick(&app, &member, "plaza", "outsider").await.assert_status(StatusCode::CONFLICT);
    kick(&app, &member, "plaza", "nobody").await.assert_status(StatusCode::NOT_FOUND);
    kick(&app, &member, "nowhere", "owner").await.assert_status(StatusCode::NOT_FOUND);
    kick(&app, &member, "plaza", " ").await.assert_status(StatusCode::BAD_REQUEST);
    kick(&app, &member, "backroom", "owner").await.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_revoke_leaves_no_ban() {
    let app = spawn_app().await;
    let owner = register_user(&app.server, "owner").await;
    let member = register_user(&app.server, "member").await;
    create_channel(&app.server, &owner, "plaza", true).await;
    join_channel(&app.server, &member, "plaza").await;

    post_as(
        &app.server,
        &member,
        "/api/channels/revoke",
        json!({ "name": "plaza", "nickname": "owner" }),
    )
    .await
    .assert_status(StatusCode::FORBIDDEN);

    let revoked = post_as(
        &app.server,
        &owner,
        "/api/channels/revoke",
        json!({ "name": "plaza", "target": "Member" }),
    )
    .await;
    revoked.assert_status_ok();
    let body: Value = revoked.json();
    assert_eq!(body["user_id"], member.id.to_string());

    post_as(
        &app.server,
        &owner,
        "/api/channels/revoke",
        json!({ "name": "plaza", "nickname": "member" }),
    )
    .await
    .assert_status(StatusCode::CONFLICT);

    try_join(&app, &member, "plaza").await.assert_status_ok();
}
