//! Channels Module
//!
//! Channel lifecycle, membership and moderation.
//!
//! - **`db`** - Channel, membership and kick-ledger rows
//! - **`moderation`** - The membership rules (`ChannelService`)
//! - **`types`** - Request/response bodies
//! - **`handlers`** - `/api/channels` endpoints

pub mod db;

pub mod moderation;

pub mod types;

pub mod handlers;

pub use moderation::{ChannelService, LeaveOutcome};
