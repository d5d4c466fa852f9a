//! Channel views and name rules
//!
//! Channel names are case-insensitive: they are trimmed and lower-cased before
//! they are stored or looked up. Nicknames follow the same folding when used
//! to address another user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

pub const CHANNEL_NAME_MIN: usize = 3;
pub const CHANNEL_NAME_MAX: usize = 50;

/// Channel as listed for one of its members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelSummary {
    pub id: Uuid,
    pub name: String,
    pub public: bool,
    pub creator_id: Uuid,
    pub members: Vec<Uuid>,
}

/// Trim and case-fold a channel name, enforcing its length bounds
pub fn normalize_channel_name(raw: &str) -> Result<String, SharedError> {
    let name = raw.trim().to_lowercase();
    let len = name.chars().count();
    if len < CHANNEL_NAME_MIN || len > CHANNEL_NAME_MAX {
        return Err(SharedError::validation(
            "name",
            format!(
                "Channel name must be {}-{} characters",
                CHANNEL_NAME_MIN, CHANNEL_NAME_MAX
            ),
        ));
    }
    // Names end up in namespace paths.
    if name.contains('/') {
        return Err(SharedError::validation("name", "Channel name cannot contain '/'"));
    }
    Ok(name)
}

/// Trim and case-fold a nickname used to address another user
pub fn normalize_nickname(raw: &str) -> Result<String, SharedError> {
    let nickname = raw.trim().to_lowercase();
    if nickname.is_empty() {
        return Err(SharedError::validation("nickname", "Invalid nickname"));
    }
    Ok(nickname)
}
