/**
 * Channel Handler Types
 *
 * Request and response bodies of the `/api/channels` endpoints.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::ChannelSummary;

fn default_public() -> bool {
    true
}

/// Create (or auto-join) request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CreateChannelRequest {
    pub name: String,
    /// Defaults to public
    #[serde(alias = "isPublic", default = "default_public")]
    pub is_public: bool,
}

/// Body of join, leave and delete
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChannelNameRequest {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PrivacyRequest {
    pub name: String,
    pub public: bool,
}

/// Body of kick and revoke
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MemberActionRequest {
    pub name: String,
    #[serde(alias = "target")]
    pub nickname: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateChannelResponse {
    pub channel: ChannelSummary,
    pub was_joined: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JoinResponse {
    pub channel: ChannelSummary,
    pub already_member: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaveResponse {
    pub success: bool,
    pub deleted: bool,
    pub left: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PrivacyResponse {
    pub channel: ChannelSummary,
    pub unchanged: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KickResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub votes_added: i64,
    pub total_votes: i64,
    pub banned: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RevokeResponse {
    pub success: bool,
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_to_public() {
        let request: CreateChannelRequest = serde_json::from_str(r#"{"name":"lounge"}"#).unwrap();
        assert!(request.is_public);

        let request: CreateChannelRequest =
            serde_json::from_str(r#"{"name":"lounge","isPublic":false}"#).unwrap();
        assert!(!request.is_public);
    }

    #[test]
    fn test_member_action_accepts_target() {
        let request: MemberActionRequest =
            serde_json::from_str(r#"{"name":"lounge","target":"bob"}"#).unwrap();
        assert_eq!(request.nickname, "bob");
    }
}
