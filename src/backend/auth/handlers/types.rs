/**
 * Authentication Handler Types
 *
 * Request and response bodies of the `/api/auth` endpoints. Request fields
 * are snake_case; the camelCase spellings older clients send are accepted
 * as aliases.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterRequest {
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    /// 3-30 characters, unique ignoring case
    pub nickname: String,
    pub email: String,
    /// At least 8 characters; hashed before storage
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token returned by login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    /// Always `"bearer"`
    #[serde(rename = "type")]
    pub token_type: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "ssr")]
impl From<crate::backend::auth::users::User> for UserResponse {
    fn from(user: crate::backend::auth::users::User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Logout response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogoutResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_accepts_camel_case() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "nickname": "ada",
            "email": "ada@example.com",
            "password": "password123",
        }))
        .unwrap();
        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.last_name, "Lovelace");
    }

    #[test]
    fn test_token_response_type_field() {
        let response = TokenResponse {
            token_type: "bearer".to_string(),
            token: "abc".to_string(),
            expires_at: Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "bearer");
    }
}
