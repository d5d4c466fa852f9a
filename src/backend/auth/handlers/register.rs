/**
 * Registration Handler
 *
 * Implements POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate the profile fields, email and password
 * 2. Hash the password with bcrypt at the configured cost
 * 3. Insert the user; a unique violation means nickname or email is taken
 * 4. Join the `general` channel when it exists
 *
 * # Validation
 *
 * - Nickname: 3-30 characters after trimming
 * - First and last name: 1-50 characters after trimming
 * - Email: `local@domain.tld` shape
 * - Password: at least 8 characters
 */

use axum::{extract::State, http::StatusCode, response::Json};
#[cfg(feature = "ssr")]
use bcrypt::hash;

use crate::backend::auth::handlers::types::{RegisterRequest, UserResponse};
use crate::backend::auth::users::{create_user, NewUser, User};
use crate::backend::channels::db as channel_db;
use crate::backend::error::BackendError;
use crate::backend::realtime::Namespace;
use crate::backend::server::state::AppState;
use crate::shared::{RealtimeEvent, SharedError};

/// Channel every new account joins
pub const DEFAULT_CHANNEL: &str = "general";

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<String, SharedError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(SharedError::validation(
            field,
            format!("{} must be {}-{} characters", field, min, max),
        ));
    }
    Ok(trimmed.to_string())
}

/// Basic `local@domain.tld` check
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}

/// Validate a registration request into the fields to store
pub fn validate_registration(request: &RegisterRequest) -> Result<NewUser, SharedError> {
    let nickname = check_length("nickname", &request.nickname, 3, 30)?;
    let first_name = check_length("first_name", &request.first_name, 1, 50)?;
    let last_name = check_length("last_name", &request.last_name, 1, 50)?;

    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(SharedError::validation("email", "Invalid email format"));
    }

    if request.password.chars().count() < 8 {
        return Err(SharedError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }

    Ok(NewUser {
        first_name,
        last_name,
        nickname,
        email,
        password_hash: String::new(),
    })
}

/// Registration handler
///
/// # Errors
///
/// * `400 Bad Request` - If a field fails validation
/// * `409 Conflict` - If the nickname or email is already registered
/// * `500 Internal Server Error` - If hashing or the insert fails
#[cfg(feature = "ssr")]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), BackendError> {
    tracing::info!("[Auth] Register request for nickname: {}", request.nickname);

    let mut new_user = validate_registration(&request)?;

    let cost = state.config.bcrypt_cost;
    let password = request.password.clone();
    // bcrypt is CPU-bound
    new_user.password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("[Auth] Hashing task failed: {:?}", e);
            BackendError::state("Failed to hash password")
        })?
        .map_err(|e| {
            tracing::error!("[Auth] Failed to hash password: {:?}", e);
            BackendError::state("Failed to hash password")
        })?;

    let user = create_user(&state.db_pool, new_user).await.map_err(|e| {
        let taken = e
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if taken {
            tracing::warn!("[Auth] Nickname or email already registered: {}", request.nickname);
            BackendError::handler(StatusCode::CONFLICT, "Nickname or email already registered")
        } else {
            BackendError::Database(e)
        }
    })?;

    join_default_channel(&state, &user).await?;

    tracing::info!("[Auth] User created: {} ({})", user.nickname, user.email);

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[cfg(feature = "ssr")]
async fn join_default_channel(state: &AppState, user: &User) -> Result<(), BackendError> {
    match channel_db::get_channel_by_name(&state.db_pool, DEFAULT_CHANNEL).await? {
        Some(channel) => {
            channel_db::add_member(&state.db_pool, user.id, channel.id).await?;
            state.hub.emit(
                &Namespace::Channel(channel.name.clone()),
                RealtimeEvent::members_updated(),
            );
        }
        None => {
            tracing::warn!(
                "[Auth] Channel '{}' does not exist; {} starts without channels",
                DEFAULT_CHANNEL,
                user.nickname
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            nickname: "ada".to_string(),
            email: "Ada@Example.com".to_string(),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let user = validate_registration(&request()).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.nickname, "ada");
    }

    #[test]
    fn test_short_nickname() {
        let mut req = request();
        req.nickname = " ab ".to_string();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_blank_first_name() {
        let mut req = request();
        req.first_name = "   ".to_string();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_short_password() {
        let mut req = request();
        req.password = "short".to_string();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b@sub.example.org"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@exa mple.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }
}
