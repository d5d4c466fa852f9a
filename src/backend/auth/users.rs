/**
 * User Model and Database Operations
 *
 * This module handles user rows. Emails are stored lower-cased; nicknames
 * keep the case the user typed but are unique and looked up case-insensitively.
 */

use chrono::{DateTime, Utc};
#[cfg(feature = "ssr")]
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::UserProfile;

/// User struct representing a user in the database
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Nickname (unique, case-insensitive)
    pub nickname: String,
    /// User email address (lower-cased)
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "ssr")]
impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            nickname: self.nickname.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Fields of a new account, already validated
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, nickname, email, password_hash, created_at, updated_at";

/// Create a new user
///
/// # Returns
/// Created user, or the database error (a unique violation means the
/// nickname or email is taken)
#[cfg(feature = "ssr")]
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        nickname: new_user.nickname,
        email: new_user.email.to_lowercase(),
        password_hash: new_user.password_hash,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, first_name, last_name, nickname, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.nickname)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    Ok(user)
}

/// Get user by email (case-insensitive)
#[cfg(feature = "ssr")]
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
}

/// Get user by nickname (case-insensitive)
#[cfg(feature = "ssr")]
pub async fn find_user_by_nickname(
    pool: &SqlitePool,
    nickname: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE LOWER(nickname) = LOWER(?)",
        USER_COLUMNS
    ))
    .bind(nickname.trim())
    .fetch_optional(pool)
    .await
}

/// Get user by ID
#[cfg(feature = "ssr")]
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
#[cfg(feature = "ssr")]
mod tests {
    use super::*;
    use crate::backend::server::config::load_database;

    fn new_user(nickname: &str, email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            nickname: nickname.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let user = create_user(&pool, new_user("Alice", "Alice@Example.com")).await.unwrap();
        assert_eq!(user.email, "alice@example.com");

        let by_email = get_user_by_email(&pool, "ALICE@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_nick = find_user_by_nickname(&pool, "  aLiCe ").await.unwrap().unwrap();
        assert_eq!(by_nick.id, user.id);
        assert_eq!(by_nick.nickname, "Alice");

        let by_id = get_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.profile().nickname, "Alice");
    }

    #[tokio::test]
    async fn test_nickname_unique_ignoring_case() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        create_user(&pool, new_user("bob", "bob@example.com")).await.unwrap();

        let err = create_user(&pool, new_user("BOB", "other@example.com")).await.unwrap_err();
        let is_unique = err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);
        assert!(is_unique);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        assert!(get_user_by_id(&pool, Uuid::new_v4()).await.unwrap().is_none());
        assert!(find_user_by_nickname(&pool, "ghost").await.unwrap().is_none());
    }
}
