/**
 * Chat Message Data Structure
 *
 * A message as it is stored per channel and pushed to channel sockets. The
 * author's public profile travels with it so clients can render a message
 * without a second lookup.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::user::UserProfile;

/// Longest body accepted for a single message
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Represents a single chat message in a channel
///
/// # Fields
/// * `id` - Message id
/// * `channel_id` - Channel the message was posted to
/// * `author_id` - Posting user
/// * `body` - Message text, trimmed
/// * `created_at` - Server time of the post
/// * `author` - Public profile of the author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: UserProfile,
}

/// Trim a message body and check it is postable
pub fn validate_body(raw: &str) -> Result<String, SharedError> {
    let body = raw.trim();
    if body.is_empty() {
        return Err(SharedError::message("Message body cannot be empty"));
    }
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(SharedError::message(format!(
            "Message body exceeds {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(body.to_string())
}
