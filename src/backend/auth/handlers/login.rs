/**
 * Login Handler
 *
 * Implements POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Insert a session row and sign a token naming it
 * 4. Tell the user's other sessions to close their sockets
 *
 * Unknown email and wrong password both return 401 with the same message.
 */
use axum::{extract::State, response::Json};
#[cfg(feature = "ssr")]
use bcrypt::verify;

use crate::backend::auth::handlers::types::{LoginRequest, TokenResponse};
use crate::backend::auth::sessions::issue_token;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::BackendError;
use crate::backend::realtime::Namespace;
use crate::backend::server::state::AppState;
use crate::shared::RealtimeEvent;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - If user is not found or password is incorrect
/// * `500 Internal Server Error` - If the database or token signing fails
#[cfg(feature = "ssr")]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, BackendError> {
    tracing::info!("[Auth] Login attempt for: {}", request.email);

    let user = get_user_by_email(&state.db_pool, &request.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("[Auth] User not found: {}", request.email);
            BackendError::unauthorized(INVALID_CREDENTIALS)
        })?;

    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify(password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("[Auth] Verification task failed: {:?}", e);
            BackendError::state("Password verification failed")
        })?
        .map_err(|e| {
            tracing::error!("[Auth] Password verification error: {:?}", e);
            BackendError::state("Password verification failed")
        })?;

    if !valid {
        tracing::warn!("[Auth] Invalid password for user: {}", user.nickname);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = issue_token(
        &state.db_pool,
        &state.config.jwt_secret,
        user.id,
        &user.email,
        state.config.token_ttl_days,
    )
    .await?;

    // Older sessions see a session id that isn't theirs and disconnect.
    state.hub.emit(
        &Namespace::User(user.id),
        RealtimeEvent::force_logout(issued.session_id),
    );

    tracing::info!("[Auth] User logged in: {} ({})", user.nickname, user.email);

    Ok(Json(TokenResponse {
        token_type: "bearer".to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
