/**
 * Authentication Middleware
 *
 * This module protects routes that require a signed-in user. It extracts
 * the bearer token, verifies its signature and expiry, checks that the
 * session it names is still live, and hands the user to handlers through
 * request extensions.
 *
 * WebSocket upgrades can't always set headers, so `authenticate_token` is
 * also called directly by the socket handlers with a `?token=` value.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::sessions::{get_session, verify_token};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from the token and its session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub session_id: Uuid,
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify a token and the session behind it
///
/// # Errors
///
/// * `401 Unauthorized` - Bad signature, expired, malformed claims, or the
///   session is missing, revoked or expired
#[cfg(feature = "ssr")]
pub async fn authenticate_token(
    pool: &SqlitePool,
    secret: &str,
    token: &str,
) -> Result<AuthenticatedUser, BackendError> {
    let claims = verify_token(secret, token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::warn!("[Auth] Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;
    let session_id = Uuid::parse_str(&claims.jti).map_err(|e| {
        tracing::warn!("[Auth] Invalid session ID in token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let session = get_session(pool, session_id).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Unknown session: {}", session_id);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    if session.user_id != user_id || !session.is_active(Utc::now()) {
        tracing::warn!("[Auth] Session {} is no longer active", session_id);
        return Err(BackendError::unauthorized("Invalid or expired token"));
    }

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
        session_id,
    })
}

/// Authentication middleware
///
/// Returns 401 if the token is missing or invalid; otherwise attaches
/// `AuthenticatedUser` to the request extensions.
#[cfg(feature = "ssr")]
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::warn!("[Auth] Missing or malformed Authorization header");
        BackendError::unauthorized("Missing bearer token")
    })?;

    let user = authenticate_token(&app_state.db_pool, &app_state.config.jwt_secret, token).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Not authenticated")
            })?;

        Ok(AuthUser(user))
    }
}
