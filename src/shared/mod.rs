//! Shared Module
//!
//! This module contains types and data structures that cross the wire between
//! the server and its clients: REST response bodies, real-time event frames,
//! configuration, and the validation helpers both sides agree on.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types. Nothing in here touches
//! the network, so the module compiles without the `ssr` feature.

/// Chat message data structure
pub mod message;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Channel and membership views
pub mod channel;

/// Invite views
pub mod invite;

/// Public user profile
pub mod user;

/// Server configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use channel::{ChannelSummary, normalize_channel_name, normalize_nickname};
pub use config::{ConfigError, ServerConfig};
pub use error::SharedError;
pub use event::{EventType, PresenceStatus, RealtimeEvent};
pub use invite::{InviteAction, InviteStatus, InviteView};
pub use message::ChatMessage;
pub use user::UserProfile;
