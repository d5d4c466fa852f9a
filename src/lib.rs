//! roomcast - Main Library
//!
//! roomcast is a multi-channel chat backend: a REST API for accounts,
//! channels and invitations, and WebSocket namespaces that push messages,
//! presence and moderation events to connected clients.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types shared with clients
//!   - Messages, channel summaries, invites, real-time event frames
//!   - Name normalization and validation
//!   - Server configuration
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket endpoints
//!   - Channel membership and moderation rules
//!   - Authentication (bcrypt, JWT, sessions)
//!   - SQLite persistence through sqlx
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Server build. Enables the backend module and its
//!   dependencies.
//!
//! # Usage
//!
//! ```rust,no_run
//! use roomcast::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation of wire types
//! - `backend::error::ModerationError` for membership rule violations
//! - `backend::error::BackendError` as the HTTP-facing error

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
