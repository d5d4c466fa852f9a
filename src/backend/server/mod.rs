//! Server Module
//!
//! This module contains the server-side plumbing around the handlers.
//!
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`config`** - Configuration loading and database setup
//! - **`init`** - App assembly
//! - **`maintenance`** - Periodic cleanup tasks
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading, database pool, migrations
//! ├── init.rs         - Server initialization and app creation
//! └── maintenance.rs  - Inactive-channel purge, namespace pruning
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use roomcast::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

/// Background maintenance
pub mod maintenance;

pub use config::InitError;
pub use init::{create_app, init_state};
pub use state::AppState;
