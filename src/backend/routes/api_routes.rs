/**
 * API Routes
 *
 * ## Public
 * - `POST /api/auth/register`
 * - `POST /api/auth/login`
 *
 * ## Behind `auth_middleware`
 * - `POST /api/auth/logout`, `GET /api/auth/me`
 * - `GET|POST /api/channels`
 * - `POST /api/channels/{join,leave,delete,privacy,kick,revoke}`
 * - `GET /api/channels/{channel_id}/members`
 * - `GET /api/channels/{channel_id}/messages`
 * - `GET|POST /api/invites`, `POST /api/invites/respond`
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{get_me, login, logout, register};
use crate::backend::channels::handlers::{
    create_channel, delete_channel, join_channel, kick_member, leave_channel, list_channels,
    list_members, list_messages, revoke_member, set_privacy,
};
use crate::backend::invites::handlers::{create_invite, list_invites, respond_invite};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Protected routes share one `route_layer`, so an unmatched path still
/// falls through to the 404 handler instead of answering 401.
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me))
        .route("/api/channels", get(list_channels).post(create_channel))
        .route("/api/channels/join", post(join_channel))
        .route("/api/channels/leave", post(leave_channel))
        .route("/api/channels/delete", post(delete_channel))
        .route("/api/channels/privacy", post(set_privacy))
        .route("/api/channels/kick", post(kick_member))
        .route("/api/channels/revoke", post(revoke_member))
        .route("/api/channels/{channel_id}/members", get(list_members))
        .route("/api/channels/{channel_id}/messages", get(list_messages))
        .route("/api/invites", get(list_invites).post(create_invite))
        .route("/api/invites/respond", post(respond_invite))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    router
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected)
}
