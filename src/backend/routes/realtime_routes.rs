//! WebSocket routes. These authenticate inside the handler (the token may
//! arrive as `?token=`), so they sit outside `auth_middleware`.

use axum::{routing::get, Router};

use crate::backend::realtime::{channel_socket, user_socket};
use crate::backend::server::state::AppState;

pub fn configure_realtime_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/ws/channels/{name}", get(channel_socket))
        .route("/ws/users/{user_id}", get(user_socket))
}
