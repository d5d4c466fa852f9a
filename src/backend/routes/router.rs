/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Health check
 * 2. API routes (auth, channels, invites)
 * 3. WebSocket routes
 * 4. Static files, when a directory is configured
 * 5. Fallback handler (JSON 404)
 */

use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::realtime_routes::configure_realtime_routes;
use crate::backend::server::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "status": 404 })),
    )
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Shared state handed to every handler
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));

    let router = configure_api_routes(router, &app_state);
    let router = configure_realtime_routes(router);

    let router = match &app_state.config.static_dir {
        Some(dir) => {
            tracing::info!("[Server] Serving static files from {}", dir);
            router.nest_service("/static", ServeDir::new(dir))
        }
        None => router,
    };

    router.fallback(not_found).with_state(app_state)
}
