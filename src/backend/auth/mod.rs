//! Authentication Module
//!
//! Accounts, sessions and bearer tokens.
//!
//! # Architecture
//!
//! - **`users`** - User rows and lookups (email, nickname, id)
//! - **`sessions`** - Session rows and HS256 JWTs carrying the session id
//! - **`handlers`** - `/api/auth/*` endpoints
//!
//! Passwords are hashed with bcrypt. Tokens expire after `TOKEN_TTL_DAYS`
//! and are rejected earlier once their session is revoked.

/// User data model and database operations
pub mod users;

/// JWT token generation, validation and session rows
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::types::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
#[cfg(feature = "ssr")]
pub use handlers::{get_me, login, logout, register};
