//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//!
//! # Architecture
//!
//! - **`types`** - `BackendError`, the error handlers return
//! - **`moderation`** - `ModerationError`, rule violations from the services
//! - **`conversion`** - `IntoResponse` and the moderation-to-backend mapping
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs         - Module exports and documentation
//! ├── types.rs       - BackendError
//! ├── moderation.rs  - ModerationError
//! └── conversion.rs  - Error conversion implementations
//! ```
//!
//! # HTTP Response Conversion
//!
//! All backend errors implement `IntoResponse`, so handlers return them
//! directly. The body is `{"error": "...", "status": n}`.

/// Error type definitions
pub mod types;

/// Membership and moderation rule violations
pub mod moderation;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use moderation::ModerationError;
pub use types::BackendError;
