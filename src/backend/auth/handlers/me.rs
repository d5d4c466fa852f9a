/**
 * Get Current User Handler
 *
 * Implements GET /api/auth/me. The auth middleware has already verified the
 * token and the session; this handler only loads the profile.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - Rejected by the middleware before reaching here
/// * `404 Not Found` - If the user row is gone
#[cfg(feature = "ssr")]
pub async fn get_me(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let user = get_user_by_id(&pool, user.user_id).await?.ok_or_else(|| {
        tracing::warn!("[Auth] User not found: {}", user.user_id);
        BackendError::handler(StatusCode::NOT_FOUND, "User not found")
    })?;

    Ok(Json(user.into()))
}
