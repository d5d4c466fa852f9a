//! Invites Module
//!
//! - **`db`** - Invite rows
//! - **`service`** - Invite rules (`InviteService`)
//! - **`handlers`** - `/api/invites` endpoints

pub mod db;

pub mod service;

pub mod handlers;

pub use service::{InviteCreated, InviteResolution, InviteService};
