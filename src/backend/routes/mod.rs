//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! - **`router`** - Main router creation and route assembly
//! - **`api_routes`** - REST endpoints
//! - **`realtime_routes`** - WebSocket endpoints
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs              - Module exports and documentation
//! ├── router.rs           - Main router creation
//! ├── api_routes.rs       - /api endpoints
//! └── realtime_routes.rs  - /ws endpoints
//! ```

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

/// WebSocket routes
pub mod realtime_routes;

pub use router::create_router;
