/**
 * Server Initialization
 *
 * This module builds the application: it opens the database, creates the
 * real-time hub, assembles the router and starts background maintenance.
 *
 * # Initialization Process
 *
 * 1. Open the database and run migrations
 * 2. Create the real-time hub
 * 3. Create and configure the router
 * 4. Spawn the maintenance tasks
 *
 * Unlike most request-time failures, a database that can't be opened or
 * migrated stops the server.
 */

use axum::Router;

use crate::backend::realtime::RealtimeHub;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, InitError};
use crate::backend::server::maintenance::spawn_maintenance;
use crate::backend::server::state::AppState;
use crate::shared::ServerConfig;

/// Open the database and build the shared state
pub async fn init_state(config: ServerConfig) -> Result<AppState, InitError> {
    let db_pool = load_database(&config.database_url).await?;
    Ok(AppState::new(db_pool, RealtimeHub::new(), config))
}

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, InitError> {
    tracing::info!("[Server] Initializing roomcast backend");

    let state = init_state(config).await?;
    let app = create_router(state.clone());
    spawn_maintenance(&state);

    tracing::info!("[Server] Router configured");
    Ok(app)
}
