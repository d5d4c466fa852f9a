/**
 * Session Management and JWT Tokens
 *
 * This module issues and verifies bearer tokens. Every token names a row in
 * the `sessions` table through its `jti` claim, so a token can be revoked
 * before it expires (logout) and a fresh login can tell older sessions to
 * shut their sockets.
 */

use chrono::{DateTime, Duration, Utc};
#[cfg(feature = "ssr")]
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ssr")]
use sqlx::SqlitePool;
use uuid::Uuid;

/// JWT claims structure
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Session ID
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Token issued at login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Session row
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[cfg(feature = "ssr")]
impl Session {
    /// Not revoked and not past its expiry
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Create a JWT token for a session
///
/// # Arguments
/// * `secret` - HS256 signing secret
/// * `user_id` - User ID (UUID)
/// * `email` - User email
/// * `session_id` - Session row the token belongs to
/// * `expires_at` - Expiry, shared with the session row
#[cfg(feature = "ssr")]
pub fn create_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    session_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        jti: session_id.to_string(),
        exp: expires_at.timestamp(),
        iat: Utc::now().timestamp(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
#[cfg(feature = "ssr")]
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

/// Insert a session row and sign a token for it
#[cfg(feature = "ssr")]
pub async fn issue_token(
    pool: &SqlitePool,
    secret: &str,
    user_id: Uuid,
    email: &str,
    ttl_days: i64,
) -> Result<IssuedToken, crate::backend::error::BackendError> {
    let session = create_session(pool, user_id, Duration::days(ttl_days)).await?;
    let token = create_token(secret, user_id, email, session.id, session.expires_at).map_err(|e| {
        tracing::error!("[Auth] Failed to create token: {:?}", e);
        crate::backend::error::BackendError::state("Failed to create token")
    })?;

    Ok(IssuedToken {
        token,
        session_id: session.id,
        expires_at: session.expires_at,
    })
}

#[cfg(feature = "ssr")]
pub async fn create_session(
    pool: &SqlitePool,
    user_id: Uuid,
    ttl: Duration,
) -> Result<Session, sqlx::Error> {
    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4(),
        user_id,
        created_at: now,
        expires_at: now + ttl,
        revoked_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, created_at, expires_at, revoked_at)
        VALUES (?, ?, ?, ?, NULL)
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(session.created_at)
    .bind(session.expires_at)
    .execute(pool)
    .await?;

    Ok(session)
}

#[cfg(feature = "ssr")]
pub async fn get_session(pool: &SqlitePool, id: Uuid) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, created_at, expires_at, revoked_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Mark a session revoked. Returns whether a live session was revoked.
#[cfg(feature = "ssr")]
pub async fn revoke_session(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE sessions SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
#[cfg(feature = "ssr")]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_verify_token() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(7);
        let token = create_token(SECRET, user_id, "test@example.com", session_id, expires_at).unwrap();

        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.jti, session_id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_invalid_token() {
        assert!(verify_token(SECRET, "invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(
            SECRET,
            Uuid::new_v4(),
            "a@b.c",
            Uuid::new_v4(),
            Utc::now() + Duration::days(1),
        )
        .unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_token(
            SECRET,
            Uuid::new_v4(),
            "a@b.c",
            Uuid::new_v4(),
            Utc::now() - Duration::hours(2),
        )
        .unwrap();
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn test_session_activity() {
        let now = Utc::now();
        let mut session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + Duration::days(1),
            revoked_at: None,
        };
        assert!(session.is_active(now));
        session.revoked_at = Some(now);
        assert!(!session.is_active(now));
        session.revoked_at = None;
        assert!(!session.is_active(now + Duration::days(2)));
    }
}
