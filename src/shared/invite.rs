//! Invite status and views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Days an invite stays answerable
pub const INVITE_TTL_DAYS: i64 = 7;

/// Lifecycle of an invite. Only `Pending` can transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ssr", derive(sqlx::Type))]
#[cfg_attr(feature = "ssr", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

/// Answer to a pending invite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteAction {
    Accept,
    Decline,
}

impl std::str::FromStr for InviteAction {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "decline" => Ok(Self::Decline),
            _ => Err(SharedError::validation("action", "Invalid action")),
        }
    }
}

/// Pending invite as listed for its recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteView {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub channel_name: String,
    pub channel_public: bool,
    pub creator_id: Uuid,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
