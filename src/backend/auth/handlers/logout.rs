/**
 * Logout Handler
 *
 * Implements POST /api/auth/logout by revoking the session the bearer token
 * names. The token itself stays signed but the auth middleware rejects it
 * from then on.
 */
use axum::{extract::State, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::LogoutResponse;
use crate::backend::auth::sessions::revoke_session;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;

#[cfg(feature = "ssr")]
pub async fn logout(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<LogoutResponse>, BackendError> {
    let revoked = revoke_session(&pool, user.session_id).await?;
    tracing::info!("[Auth] Logout for {} (session revoked: {})", user.user_id, revoked);

    Ok(Json(LogoutResponse { success: true }))
}
