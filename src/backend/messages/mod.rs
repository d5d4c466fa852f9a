//! Messages Module
//!
//! - **`db`** - Message rows
//! - **`service`** - Posting and listing (`MessageService`)

pub mod db;

pub mod service;

pub use service::MessageService;
