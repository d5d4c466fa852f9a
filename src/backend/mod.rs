//! Backend Module
//!
//! This module contains all server-side code for roomcast.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Registration, login, sessions and JWT tokens
//! - **`channels`** - Channel lifecycle, membership and moderation
//! - **`invites`** - Invitations to channels
//! - **`messages`** - Channel messages
//! - **`realtime`** - Namespaces, broadcasting and WebSocket endpoints
//! - **`middleware`** - Request authentication
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization, state, maintenance
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── channels/       - Membership and moderation
//! ├── invites/        - Invitations
//! ├── messages/       - Message persistence
//! ├── realtime/       - Event fan-out and sockets
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Consistency
//!
//! Every state change is written to SQLite before it is broadcast. Sockets
//! hold no authoritative state; a client that missed events re-fetches over
//! REST.

/// Server initialization and state
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication
pub mod auth;

/// Channel membership and moderation
pub mod channels;

/// Invitations
pub mod invites;

/// Channel messages
pub mod messages;

/// Real-time event broadcasting
pub mod realtime;

/// Request middleware
pub mod middleware;

/// Error types
pub mod error;
