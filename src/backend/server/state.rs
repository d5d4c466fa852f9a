/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - The SQLite pool
 * - The real-time hub (namespace registry)
 * - The loaded `ServerConfig`
 *
 * Everything is cheap to clone: the pool and the hub are handles over
 * shared internals, and the config sits behind an `Arc`.
 *
 * # State Extraction
 *
 * Handlers extract only what they use. The services (`ChannelService`,
 * `InviteService`, `MessageService`) are built from the pool and the hub on
 * extraction.
 *
 * ```rust,ignore
 * async fn handler(State(channels): State<ChannelService>) { /* ... */ }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::channels::ChannelService;
use crate::backend::invites::InviteService;
use crate::backend::messages::MessageService;
use crate::backend::realtime::RealtimeHub;
use crate::shared::ServerConfig;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub hub: RealtimeHub,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, hub: RealtimeHub, config: ServerConfig) -> Self {
        Self {
            db_pool,
            hub,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}

impl FromRef<AppState> for RealtimeHub {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for ChannelService {
    fn from_ref(state: &AppState) -> Self {
        ChannelService::new(state.db_pool.clone(), state.hub.clone())
    }
}

impl FromRef<AppState> for InviteService {
    fn from_ref(state: &AppState) -> Self {
        InviteService::new(state.db_pool.clone(), state.hub.clone())
    }
}

impl FromRef<AppState> for MessageService {
    fn from_ref(state: &AppState) -> Self {
        MessageService::new(state.db_pool.clone(), state.hub.clone())
    }
}
