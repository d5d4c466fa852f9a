//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! ├── logout.rs    - Session revocation handler
//! └── me.rs        - Get current user handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`logout`** - POST /api/auth/logout
//! - **`get_me`** - GET /api/auth/me
//!
//! # Authentication Flow
//!
//! 1. **Register**: profile + password → user created, joined to `general`
//! 2. **Login**: email + password → session row + bearer token
//! 3. **Authenticated calls**: token verified, session checked for revocation
//! 4. **Logout**: session revoked; the token stops working immediately

/// Request and response types
pub mod types;

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Logout handler
pub mod logout;

/// Get current user handler
pub mod me;

// Re-export commonly used types
pub use types::{LoginRequest, LogoutResponse, RegisterRequest, TokenResponse, UserResponse};

// Re-export handlers
#[cfg(feature = "ssr")]
pub use login::login;
#[cfg(feature = "ssr")]
pub use logout::logout;
#[cfg(feature = "ssr")]
pub use me::get_me;
#[cfg(feature = "ssr")]
pub use register::register;
