//! Common test utilities and helpers
//!
//! - App fixtures over a private in-memory database
//! - Authentication helpers (register, login, bearer requests)

#![allow(dead_code)]

pub mod auth_helpers;

pub use auth_helpers::*;

use axum_test::TestServer;
use roomcast::backend::routes::create_router;
use roomcast::backend::server::{init_state, AppState};
use roomcast::shared::ServerConfig;

/// Server plus the state behind it, for tests that reach past HTTP
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .database_url("sqlite::memory:")
        .jwt_secret("integration-test-secret")
        .bcrypt_cost(4)
        .static_dir(None)
        .build()
        .expect("valid test config")
}

/// App served through axum-test's in-process transport
pub async fn spawn_app() -> TestApp {
    let state = init_state(test_config()).await.expect("state initializes");
    let server = TestServer::new(create_router(state.clone())).expect("test server starts");
    TestApp { server, state }
}

/// App bound to a real port; needed for WebSocket upgrades
pub async fn spawn_http_app() -> TestApp {
    let state = init_state(test_config()).await.expect("state initializes");
    let server = TestServer::builder()
        .http_transport()
        .build(create_router(state.clone()))
        .expect("test server starts");
    TestApp { server, state }
}
