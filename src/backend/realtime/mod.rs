//! Real-time Module
//!
//! Fan-out of events to connected WebSocket clients.
//!
//! - **`broadcast`** - `Envelope` and the send helper
//! - **`hub`** - Namespace registry (`RealtimeHub`)
//! - **`socket`** - `/ws/channels/{name}` and `/ws/users/{user_id}`
//!
//! # Namespaces
//!
//! ```text
//! /channels/{name}   message, status, typing, channel:*
//! /users/{id}        invite:new, auth:logout
//! ```
//!
//! Emitting never fails the caller: an event for a namespace with no
//! listeners is dropped.

/// Event envelopes and broadcasting
pub mod broadcast;

/// Namespace registry
pub mod hub;

/// WebSocket handlers
pub mod socket;

pub use broadcast::{broadcast_event, Envelope, RealtimeEventBroadcast};
pub use hub::{Namespace, RealtimeHub};
pub use socket::{channel_socket, user_socket};
