//! Authentication test helpers

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "password123";

/// Registered and logged-in user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub token: String,
}

/// Register `nickname` and log in
pub async fn register_user(server: &TestServer, nickname: &str) -> TestUser {
    let email = format!("{}@example.com", nickname.to_lowercase());
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "first_name": "Test",
            "last_name": nickname,
            "nickname": nickname,
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()).expect("user id");

    let token = login(server, &email).await;

    TestUser {
        id,
        nickname: nickname.to_string(),
        email,
        token,
    }
}

/// Log in with the test password and return the bearer token
pub async fn login(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().expect("token").to_string()
}

/// `POST` a JSON body as `user`
pub async fn post_as(server: &TestServer, user: &TestUser, path: &str, body: Value) -> axum_test::TestResponse {
    server
        .post(path)
        .authorization_bearer(&user.token)
        .json(&body)
        .await
}

/// `GET` as `user`
pub async fn get_as(server: &TestServer, user: &TestUser, path: &str) -> axum_test::TestResponse {
    server.get(path).authorization_bearer(&user.token).await
}

/// Create a channel and return its id
pub async fn create_channel(server: &TestServer, owner: &TestUser, name: &str, public: bool) -> Uuid {
    let response = post_as(
        server,
        owner,
        "/api/channels",
        json!({ "name": name, "is_public": public }),
    )
    .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["channel"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("channel id")
}

/// Join a public channel, asserting success
pub async fn join_channel(server: &TestServer, user: &TestUser, name: &str) {
    post_as(server, user, "/api/channels/join", json!({ "name": name }))
        .await
        .assert_status_ok();
}
