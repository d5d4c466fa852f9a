//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - Bearer-token authentication for the `/api` routes

pub mod auth;

pub use auth::{auth_middleware, authenticate_token, bearer_token, AuthUser, AuthenticatedUser};
